use hookrelay_core::constants::{MAX_CONTENT_CHARS, MAX_USERNAME_CHARS};
use hookrelay_core::RelayMessage;
use reqwest::Url;

use crate::ServiceError;

/// Check caller input and build the message the store will hold.
///
/// Content is kept as given; only its trimmed form must be non-empty. Blank
/// optional fields are treated as absent.
pub fn validate_message(
    webhook_url: &str,
    content: &str,
    username: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<RelayMessage, ServiceError> {
    if content.trim().is_empty() {
        return Err(ServiceError::InvalidInput("content is required and cannot be empty".to_owned()));
    }
    let content_chars = content.chars().count();
    if content_chars > MAX_CONTENT_CHARS {
        return Err(ServiceError::InvalidInput(format!(
            "content is {content_chars} characters, maximum is {MAX_CONTENT_CHARS}"
        )));
    }

    let destination = parse_http_url("webhook_url", webhook_url)?;
    let mut message = RelayMessage::new(content, destination);

    if let Some(name) = username.map(str::trim).filter(|n| !n.is_empty()) {
        if name.chars().count() > MAX_USERNAME_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "username is longer than {MAX_USERNAME_CHARS} characters"
            )));
        }
        message = message.with_display_name(name);
    }

    if let Some(avatar) = avatar_url.map(str::trim).filter(|a| !a.is_empty()) {
        message = message.with_avatar_url(parse_http_url("avatar_url", avatar)?);
    }

    Ok(message)
}

/// Validates `raw` as an http(s) URL and returns it trimmed but otherwise as given.
fn parse_http_url(field: &str, raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ServiceError::InvalidInput(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ServiceError::InvalidInput(format!(
            "{field} must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ServiceError::InvalidInput(format!("{field} has no host")));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOOK: &str = "https://discord.com/api/webhooks/1/abc";

    #[test]
    fn test_valid_message() {
        let msg = validate_message(HOOK, "hello", Some("bot"), Some("https://cdn.example/a.png")).unwrap();
        assert_eq!(msg.content, "hello");
        assert_eq!(msg.destination, HOOK);
        assert_eq!(msg.display_name.as_deref(), Some("bot"));
        assert_eq!(msg.avatar_url.as_deref(), Some("https://cdn.example/a.png"));
    }

    #[test]
    fn test_empty_content_rejected() {
        let err = validate_message(HOOK, "   \n", None, None).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("content is required"));
    }

    #[test]
    fn test_content_length_limit() {
        let at_limit = "x".repeat(MAX_CONTENT_CHARS);
        assert!(validate_message(HOOK, &at_limit, None, None).is_ok());
        let over = "é".repeat(MAX_CONTENT_CHARS + 1);
        assert!(validate_message(HOOK, &over, None, None).is_err());
    }

    #[test]
    fn test_bad_urls_rejected() {
        assert!(validate_message("not a url", "hi", None, None).is_err());
        assert!(validate_message("ftp://example.com/hook", "hi", None, None).is_err());
        assert!(validate_message("", "hi", None, None).is_err());
        let err = validate_message(HOOK, "hi", None, Some("javascript:alert(1)")).unwrap_err();
        assert!(err.to_string().contains("avatar_url"));
    }

    #[test]
    fn test_blank_optionals_are_absent() {
        let msg = validate_message(HOOK, "hi", Some("  "), Some("")).unwrap();
        assert!(msg.display_name.is_none());
        assert!(msg.avatar_url.is_none());
    }

    #[test]
    fn test_username_length_limit() {
        let long = "n".repeat(MAX_USERNAME_CHARS + 1);
        assert!(validate_message(HOOK, "hi", Some(&long), None).is_err());
    }

    #[test]
    fn test_urls_kept_as_given() {
        let msg = validate_message(" https://x ", "hi", None, Some("https://cdn.example/A%20b.png?s=1")).unwrap();
        assert_eq!(msg.destination, "https://x");
        assert_eq!(msg.avatar_url.as_deref(), Some("https://cdn.example/A%20b.png?s=1"));
    }
}
