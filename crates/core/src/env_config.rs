//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => parse_or_default(var, &v, default),
        Err(_) => default,
    }
}

fn parse_or_default<T: std::str::FromStr + std::fmt::Display>(var: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(
                var,
                value = %raw,
                default = %default,
                "invalid env var value, using default"
            );
            default
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_value() {
        let result: u64 = parse_or_default("HOOKRELAY_TTL_SECS", "42", 10);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let result: u64 = parse_or_default("HOOKRELAY_TTL_SECS", " 7\n", 10);
        assert_eq!(result, 7);
    }

    #[test]
    fn test_parse_invalid_value() {
        let result: u64 = parse_or_default("HOOKRELAY_TTL_SECS", "banana", 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_parse_empty_value() {
        let result: u64 = parse_or_default("HOOKRELAY_TTL_SECS", "", 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let result: u32 = env_parse_with_default("HOOKRELAY_TEST_MISSING_98273", 10);
        assert_eq!(result, 10);
    }
}
