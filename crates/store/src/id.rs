use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of request identifiers. Implementations must never repeat an id
/// within one process lifetime.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 ids (122 bits of entropy), no coordination needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` ids for tests and reproducible runs.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialGenerator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: AtomicU64::new(1) }
    }
}

impl IdGenerator for SequentialGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_uuid_ids_unique_across_threads() {
        let seen = Mutex::new(HashSet::new());
        let generator = UuidGenerator;
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let ids: Vec<String> = (0..2_000).map(|_| generator.next_id()).collect();
                    let mut seen = seen.lock().unwrap();
                    for id in ids {
                        assert!(seen.insert(id), "duplicate id generated");
                    }
                });
            }
        });
        assert_eq!(seen.lock().unwrap().len(), 16_000);
    }

    #[test]
    fn test_uuid_id_format() {
        let id = UuidGenerator.next_id();
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_sequential_ids() {
        let generator = SequentialGenerator::new("req");
        assert_eq!(generator.next_id(), "req-1");
        assert_eq!(generator.next_id(), "req-2");
    }
}
