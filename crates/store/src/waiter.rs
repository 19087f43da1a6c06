use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use hookrelay_core::RequestRecord;

use crate::LifecycleStore;

/// Past `expires_at` by this much the lazy expiry check is certain to fire.
const EXPIRY_SLACK: Duration = Duration::from_millis(1);

/// Fallback deadline for absurdly large timeouts (one year).
const MAX_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Suspends a request flow until its record is terminal or a deadline passes.
///
/// Waiting is driven by the store's per-record status channel, so a terminal
/// update wakes the waiter immediately. Ids the store does not hold have no
/// channel and are rechecked every `poll_interval` instead.
#[derive(Clone)]
pub struct CompletionWaiter {
    store: Arc<LifecycleStore>,
    poll_interval: Duration,
}

impl CompletionWaiter {
    #[must_use]
    pub fn new(store: Arc<LifecycleStore>, poll_interval: Duration) -> Self {
        Self { store, poll_interval: poll_interval.max(Duration::from_millis(1)) }
    }

    /// Wait up to `timeout` for `id` to become terminal.
    ///
    /// Returns the terminal snapshot, or `None` if the deadline passed first
    /// (including when the record is unknown or was reaped meanwhile).
    /// Does not affect the dispatch itself.
    pub async fn wait_for_completion(&self, id: &str, timeout: Duration) -> Option<RequestRecord> {
        let started = Instant::now();
        let deadline = started.checked_add(timeout).unwrap_or(started + MAX_WAIT);

        loop {
            match self.store.watch(id) {
                Some((record, _)) if record.status.is_terminal() => {
                    tracing::debug!(
                        request_id = %id,
                        status = %record.status,
                        waited_ms = started.elapsed().as_millis(),
                        "Request reached terminal state"
                    );
                    return Some(record);
                },
                Some((record, mut status_rx)) => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    let wake = expiry_wake(&record, deadline);
                    // status change, reaped record (sender dropped) and elapsed
                    // timer all lead to the same re-read
                    let _ = tokio::time::timeout_at(wake, status_rx.changed()).await;
                },
                None => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    let next =
                        now.checked_add(self.poll_interval).map_or(deadline, |at| at.min(deadline));
                    tokio::time::sleep_until(next).await;
                },
            }
        }

        tracing::debug!(request_id = %id, timeout_ms = timeout.as_millis(), "Wait deadline reached");
        None
    }
}

/// The earlier of `deadline` and the moment the record's lazy expiry would fire.
fn expiry_wake(record: &RequestRecord, deadline: Instant) -> Instant {
    let remaining = (record.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    Instant::now()
        .checked_add(remaining.saturating_add(EXPIRY_SLACK))
        .map_or(deadline, |at| at.min(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookrelay_core::{DispatchOutcome, RecordUpdate, RelayMessage, RequestStatus};
    use std::collections::BTreeMap;

    const POLL: Duration = Duration::from_millis(100);

    fn setup(ttl: Duration) -> (Arc<LifecycleStore>, CompletionWaiter) {
        let store = Arc::new(LifecycleStore::new(ttl));
        let waiter = CompletionWaiter::new(Arc::clone(&store), POLL);
        (store, waiter)
    }

    fn ok_outcome() -> DispatchOutcome {
        DispatchOutcome::new(200, BTreeMap::new(), r#"{"ok":true}"#)
    }

    #[tokio::test]
    async fn test_returns_immediately_when_already_terminal() {
        let (store, waiter) = setup(Duration::from_secs(1800));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));
        store.update("A", RecordUpdate::completed(ok_outcome()));

        let started = std::time::Instant::now();
        let record = waiter.wait_for_completion("A", Duration::from_millis(5000)).await.unwrap();

        assert_eq!(record.status, RequestStatus::Completed);
        assert!(started.elapsed() < POLL / 2, "waited {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_honors_timeout_when_never_updated() {
        let (store, waiter) = setup(Duration::from_secs(1800));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));

        let reads_before = store.reads();
        let started = std::time::Instant::now();
        let result = waiter.wait_for_completion("A", Duration::from_millis(300)).await;
        let elapsed = started.elapsed();

        assert!(result.is_none());
        // once on entry and once more after the deadline wake
        assert!(store.reads() - reads_before >= 2, "read {} times", store.reads() - reads_before);
        assert!(elapsed >= Duration::from_millis(300), "returned early after {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1000), "returned late after {elapsed:?}");
        assert_eq!(store.get("A").unwrap().status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_woken_by_terminal_update() {
        let (store, waiter) = setup(Duration::from_secs(1800));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));

        let writer = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            writer.update("A", RecordUpdate::completed(ok_outcome()));
        });

        let started = std::time::Instant::now();
        let record = waiter.wait_for_completion("A", Duration::from_secs(5)).await.unwrap();

        assert_eq!(record.status, RequestStatus::Completed);
        assert_eq!(record.outcome.unwrap().status_code, 200);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_observes_lazy_timeout() {
        let (store, waiter) = setup(Duration::from_millis(100));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));

        let started = std::time::Instant::now();
        let record = waiter.wait_for_completion("A", Duration::from_secs(5)).await.unwrap();

        assert_eq!(record.status, RequestStatus::Timeout);
        assert!(started.elapsed() >= Duration::from_millis(90));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_reaped_record_waits_out_deadline() {
        let (store, waiter) = setup(Duration::from_millis(20));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.sweep(), 1);

        let started = std::time::Instant::now();
        let result = waiter.wait_for_completion("A", Duration::from_millis(250)).await;

        assert!(result.is_none());
        assert!(started.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_record_reaped_mid_wait() {
        let (store, waiter) = setup(Duration::from_secs(1800));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));

        let reaper = Arc::clone(&store);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            reaper.remove("A");
        });

        let started = std::time::Instant::now();
        let result = waiter.wait_for_completion("A", Duration::from_millis(200)).await;

        assert!(result.is_none());
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(store.get("A").is_none());
    }

    #[tokio::test]
    async fn test_unknown_id_returns_none_at_deadline() {
        let (_store, waiter) = setup(Duration::from_secs(1800));

        let started = std::time::Instant::now();
        let result = waiter.wait_for_completion("nope", Duration::from_millis(150)).await;

        assert!(result.is_none());
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_concurrent_waiters_do_not_block_each_other() {
        let (store, waiter) = setup(Duration::from_secs(1800));
        store.create("slow".to_owned(), RelayMessage::new("a", "https://x"));
        store.create("fast".to_owned(), RelayMessage::new("b", "https://x"));

        let slow_waiter = waiter.clone();
        let slow = tokio::spawn(async move {
            slow_waiter.wait_for_completion("slow", Duration::from_millis(400)).await
        });

        store.update("fast", RecordUpdate::failed(DispatchOutcome::unreachable("refused")));
        let started = std::time::Instant::now();
        let fast = waiter.wait_for_completion("fast", Duration::from_secs(5)).await.unwrap();
        assert_eq!(fast.status, RequestStatus::Failed);
        assert!(started.elapsed() < Duration::from_millis(100));

        assert!(slow.await.unwrap().is_none());
    }
}
