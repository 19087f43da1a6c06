use std::sync::Arc;
use std::time::Duration;

use hookrelay_core::{RelayConfig, RelayMessage, RequestRecord};
use hookrelay_store::{CompletionWaiter, IdGenerator, LifecycleStore, StoreStats, UuidGenerator};
use hookrelay_webhook::{Dispatcher, WebhookClient};

use crate::ServiceError;

/// What a synchronous send could tell the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryReport {
    /// The record reached a terminal state within the wait.
    Finished(RequestRecord),
    /// Still in flight; look it up later by id.
    Pending { request_id: String },
}

/// Runs the relay flow: mint an id, record it, dispatch in the background,
/// then either wait for the outcome or hand back the id.
pub struct RelayService {
    store: Arc<LifecycleStore>,
    waiter: CompletionWaiter,
    dispatcher: Arc<dyn Dispatcher>,
    ids: Arc<dyn IdGenerator>,
    config: RelayConfig,
}

impl RelayService {
    #[must_use]
    pub fn new(
        store: Arc<LifecycleStore>,
        dispatcher: Arc<dyn Dispatcher>,
        ids: Arc<dyn IdGenerator>,
        config: RelayConfig,
    ) -> Self {
        let waiter = CompletionWaiter::new(Arc::clone(&store), config.poll_interval);
        Self { store, waiter, dispatcher, ids, config }
    }

    /// Service backed by a real webhook client and random ids.
    pub fn with_webhook(store: Arc<LifecycleStore>, config: RelayConfig) -> Result<Self, ServiceError> {
        let client = WebhookClient::new(config.dispatch_timeout)?;
        Ok(Self::new(store, Arc::new(client), Arc::new(UuidGenerator), config))
    }

    #[must_use]
    pub const fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Register a pending record and start its single delivery attempt.
    ///
    /// Must be called within a tokio runtime.
    pub fn dispatch(&self, message: RelayMessage) -> RequestRecord {
        let record = self.store.create(self.ids.next_id(), message.clone());
        tracing::info!(request_id = %record.id, "Dispatching webhook message");

        let store = Arc::clone(&self.store);
        let dispatcher = Arc::clone(&self.dispatcher);
        let id = record.id.clone();
        tokio::spawn(async move {
            let update = dispatcher.dispatch(&message).await;
            let status = update.status;
            if store.update(&id, update) {
                tracing::info!(request_id = %id, status = ?status, "Webhook dispatch finished");
            } else {
                tracing::debug!(request_id = %id, "Dispatch result arrived after record expired or was reaped");
            }
        });

        record
    }

    /// Dispatch and wait up to `timeout` (capped to the configured maximum)
    /// for the outcome.
    pub async fn send_and_wait(&self, message: RelayMessage, timeout: Option<Duration>) -> DeliveryReport {
        let record = self.dispatch(message);
        match self.wait_for_completion(&record.id, timeout).await {
            Some(done) => DeliveryReport::Finished(done),
            None => DeliveryReport::Pending { request_id: record.id },
        }
    }

    pub async fn wait_for_completion(&self, id: &str, timeout: Option<Duration>) -> Option<RequestRecord> {
        let timeout = self.config.effective_wait(timeout);
        self.waiter.wait_for_completion(id, timeout).await
    }

    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<RequestRecord> {
        self.store.get(id)
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }
}
