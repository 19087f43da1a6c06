use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::LifecycleStore;

/// Longest sweep period honored (one year); larger intervals are clamped so
/// the first tick can always be scheduled.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Running sweep task. [`shutdown`](Self::shutdown) stops it and waits for
/// it to exit; dropping the handle stops it without waiting.
pub struct SweepHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Stop the sweep loop and wait for the task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Sweep task ended abnormally");
        }
    }
}

/// Spawns background task that deletes expired records every `interval`.
///
/// The first sweep runs one full interval after startup.
pub fn spawn_sweeper(store: Arc<LifecycleStore>, interval: Duration) -> SweepHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let period = interval.clamp(Duration::from_millis(1), MAX_SWEEP_INTERVAL);
    if period != interval {
        tracing::warn!(
            requested_secs = interval.as_secs_f64(),
            used_secs = period.as_secs_f64(),
            "Sweep interval out of range, clamped"
        );
    }

    let task = tokio::spawn(async move {
        let now = tokio::time::Instant::now();
        let mut ticker = match now.checked_add(period) {
            Some(start) => tokio::time::interval_at(start, period),
            None => tokio::time::interval(period),
        };
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::debug!(interval_secs = period.as_secs_f64(), "Sweep task started");
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sweep task stopping");
                    break;
                },
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    if removed > 0 {
                        tracing::info!(removed, remaining = store.len(), "Expired request records swept");
                    } else {
                        tracing::debug!(remaining = store.len(), "Sweep found nothing to remove");
                    }
                },
            }
        }
    });

    SweepHandle { shutdown_tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookrelay_core::RelayMessage;

    #[tokio::test]
    async fn test_sweeper_reaps_expired_records() {
        let store = Arc::new(LifecycleStore::new(Duration::from_millis(30)));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));
        let handle = spawn_sweeper(Arc::clone(&store), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.is_empty());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_sweeping() {
        let store = Arc::new(LifecycleStore::new(Duration::from_millis(10)));
        let handle = spawn_sweeper(Arc::clone(&store), Duration::from_millis(20));
        handle.shutdown().await;

        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));
        tokio::time::sleep(Duration::from_millis(100)).await;

        // still stored; only a read marks it timed out, nothing deletes it
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_huge_interval_keeps_task_alive() {
        let store = Arc::new(LifecycleStore::new(Duration::from_secs(1800)));
        let handle = spawn_sweeper(Arc::clone(&store), Duration::from_secs(u64::MAX));

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.task.is_finished(), "sweep task exited on its own");
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_zero_interval_still_sweeps() {
        let store = Arc::new(LifecycleStore::new(Duration::from_millis(10)));
        store.create("A".to_owned(), RelayMessage::new("hi", "https://x"));
        let handle = spawn_sweeper(Arc::clone(&store), Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(store.is_empty());
        handle.shutdown().await;
    }
}
