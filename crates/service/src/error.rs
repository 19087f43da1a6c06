//! Typed error enum for the service layer.

use hookrelay_webhook::WebhookError;
use thiserror::Error;

/// Service-layer error. Per-request delivery failures are never reported
/// here; they end up as data in the request record.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller provided invalid input (empty content, malformed URL).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Webhook client could not be constructed.
    #[error("webhook: {0}")]
    Webhook(#[from] WebhookError),
}

impl ServiceError {
    /// Whether the caller can fix this by changing the request.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
