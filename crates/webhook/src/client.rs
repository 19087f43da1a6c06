use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use hookrelay_core::{DispatchOutcome, RecordUpdate, RelayMessage};
use reqwest::header::HeaderMap;
use serde::Serialize;

use crate::error::WebhookError;

/// Body posted to the webhook, in the shape common chat webhooks accept.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
}

impl<'a> From<&'a RelayMessage> for WebhookPayload<'a> {
    fn from(message: &'a RelayMessage) -> Self {
        Self {
            content: &message.content,
            username: message.display_name.as_deref(),
            avatar_url: message.avatar_url.as_deref(),
        }
    }
}

/// Performs the outbound call for a message and reports a terminal update.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, message: &RelayMessage) -> RecordUpdate;
}

/// Client for webhook POSTs.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    /// Creates a client whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hookrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WebhookError::ClientInit(e.to_string()))?;
        Ok(Self { client })
    }

    /// POST the message to its destination once.
    ///
    /// # Errors
    /// Returns an error if the request could not be sent or the endpoint
    /// answered with a non-success status.
    pub async fn deliver(&self, message: &RelayMessage) -> Result<DispatchOutcome, WebhookError> {
        let response = self
            .client
            .post(&message.destination)
            .json(&WebhookPayload::from(message))
            .send()
            .await?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(status = status.as_u16(), error = %e, "Failed to read webhook response body");
                String::new()
            },
        };
        let outcome = DispatchOutcome::new(status.as_u16(), headers, &body);

        if status.is_success() {
            Ok(outcome)
        } else {
            Err(WebhookError::HttpStatus { code: status.as_u16(), outcome: Box::new(outcome) })
        }
    }
}

#[async_trait]
impl Dispatcher for WebhookClient {
    async fn dispatch(&self, message: &RelayMessage) -> RecordUpdate {
        classify(self.deliver(message).await)
    }
}

/// Success becomes `Completed`, anything else `Failed`.
#[must_use]
pub fn classify(result: Result<DispatchOutcome, WebhookError>) -> RecordUpdate {
    match result {
        Ok(outcome) => RecordUpdate::completed(outcome),
        Err(e) => {
            tracing::warn!(status = e.status_code(), transient = e.is_transient(), error = %e, "Webhook delivery failed");
            RecordUpdate::failed(e.into_outcome())
        },
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        // opaque (non-UTF-8) bytes are kept with replacement characters
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_owned())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}
