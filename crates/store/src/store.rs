use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;

use hookrelay_core::{RecordUpdate, RelayMessage, RequestRecord, RequestStatus};

/// A stored record plus the channel its status changes are published on.
struct Slot {
    record: RequestRecord,
    status_tx: watch::Sender<RequestStatus>,
}

impl Slot {
    fn new(record: RequestRecord) -> Self {
        let (status_tx, _) = watch::channel(record.status);
        Self { record, status_tx }
    }

    fn expire_if_due(&mut self, now: DateTime<Utc>) {
        if self.record.expire_if_due(now) {
            tracing::info!(request_id = %self.record.id, "Pending request expired, marked timeout");
            self.publish();
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.record.status);
    }
}

/// Counts of stored records by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
    pub timeout: usize,
}

/// In-memory store of request records keyed by id.
///
/// Each operation locks only the entry it touches, so writers and readers of
/// the same id are serialized while different ids proceed concurrently.
pub struct LifecycleStore {
    records: DashMap<String, Slot>,
    ttl: Duration,
    #[cfg(test)]
    reads: std::sync::atomic::AtomicUsize,
}

impl LifecycleStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: DashMap::new(),
            ttl,
            #[cfg(test)]
            reads: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert a new pending record and return its snapshot.
    ///
    /// # Panics
    /// Panics if `id` is already present: that means the id generator repeated itself.
    pub fn create(&self, id: String, message: RelayMessage) -> RequestRecord {
        match self.records.entry(id) {
            Entry::Occupied(entry) => {
                panic!("duplicate request id {}: id generator returned a live id", entry.key())
            },
            Entry::Vacant(entry) => {
                let record = RequestRecord::new(entry.key().clone(), message, Utc::now(), self.ttl);
                tracing::debug!(
                    request_id = %record.id,
                    expires_at = %record.expires_at,
                    "Request record created"
                );
                entry.insert(Slot::new(record.clone()));
                record
            },
        }
    }

    /// Current snapshot of a record. A pending record past its expiry is
    /// switched to `Timeout` before it is returned.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<RequestRecord> {
        self.count_read();
        let mut slot = self.records.get_mut(id)?;
        slot.expire_if_due(Utc::now());
        Some(slot.record.clone())
    }

    /// Like [`get`](Self::get), plus a receiver for subsequent status changes.
    /// Both are taken under the same entry lock, so no change can slip between them.
    #[must_use]
    pub fn watch(&self, id: &str) -> Option<(RequestRecord, watch::Receiver<RequestStatus>)> {
        self.count_read();
        let mut slot = self.records.get_mut(id)?;
        slot.expire_if_due(Utc::now());
        Some((slot.record.clone(), slot.status_tx.subscribe()))
    }

    /// Merge `update` into the record. Unknown ids, terminal records and
    /// backwards transitions are ignored. Returns whether the record changed.
    pub fn update(&self, id: &str, update: RecordUpdate) -> bool {
        let Some(mut slot) = self.records.get_mut(id) else {
            tracing::debug!(request_id = %id, "Update for unknown or reaped request ignored");
            return false;
        };
        let previous = slot.record.status;
        if !slot.record.apply(update) {
            tracing::debug!(request_id = %id, status = %previous, "Update ignored");
            return false;
        }
        tracing::debug!(
            request_id = %id,
            from = %previous,
            to = %slot.record.status,
            "Request status updated"
        );
        slot.publish();
        true
    }

    /// Delete every record whose expiry has passed, whatever its status.
    /// Returns the number of records removed.
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0_usize;
        self.records.retain(|_, slot| {
            let keep = !slot.record.is_expired_at(now);
            if !keep {
                removed = removed.saturating_add(1);
            }
            keep
        });
        removed
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats::default();
        for slot in &self.records {
            stats.total = stats.total.saturating_add(1);
            let counter = match slot.record.status {
                RequestStatus::Pending => &mut stats.pending,
                RequestStatus::Completed => &mut stats.completed,
                RequestStatus::Failed => &mut stats.failed,
                RequestStatus::Timeout => &mut stats.timeout,
            };
            *counter = counter.saturating_add(1);
        }
        stats
    }

    #[cfg(test)]
    fn count_read(&self) {
        self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(not(test))]
    #[inline]
    const fn count_read(&self) {}

    /// Number of `get`/`watch` calls so far.
    #[cfg(test)]
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Drop a record regardless of expiry, as the sweep would.
    #[cfg(test)]
    pub(crate) fn remove(&self, id: &str) -> bool {
        self.records.remove(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
