use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::RelayError;

/// Lifecycle state of a relayed request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Completed,
    Failed,
    Timeout,
}

impl RequestStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
        }
    }

    /// Completed, failed and timed-out requests never change again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(*self, Self::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "timeout" => Ok(Self::Timeout),
            _ => Err(RelayError::InvalidInput(format!("Invalid request status: {s}"))),
        }
    }
}

/// What the webhook endpoint answered (or a synthesized answer when it could not be reached).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// HTTP status code, `0` when no response was received.
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON when the body was JSON, a string otherwise, `null` when empty.
    pub body: serde_json::Value,
    pub observed_at: DateTime<Utc>,
}

impl DispatchOutcome {
    #[must_use]
    pub fn new(status_code: u16, headers: BTreeMap<String, String>, raw_body: &str) -> Self {
        Self { status_code, headers, body: parse_body(raw_body), observed_at: Utc::now() }
    }

    /// Outcome for a request that never got an HTTP response.
    #[must_use]
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            status_code: 0,
            headers: BTreeMap::new(),
            body: serde_json::Value::String(reason.into()),
            observed_at: Utc::now(),
        }
    }
}

fn parse_body(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()))
}

/// A validated message ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub content: String,
    pub destination: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl RelayMessage {
    #[must_use]
    pub fn new(content: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            destination: destination.into(),
            display_name: None,
            avatar_url: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// One tracked outbound relay attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: String,
    pub content: String,
    pub destination: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DispatchOutcome>,
}

impl RequestRecord {
    /// Build a pending record. `expires_at` is fixed here and never moves.
    #[must_use]
    pub fn new(id: String, message: RelayMessage, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            id,
            content: message.content,
            destination: message.destination,
            display_name: message.display_name,
            avatar_url: message.avatar_url,
            status: RequestStatus::Pending,
            created_at,
            expires_at,
            outcome: None,
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Move a stale pending record to `Timeout`. Returns whether anything changed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == RequestStatus::Pending && self.is_expired_at(now) {
            self.status = RequestStatus::Timeout;
            return true;
        }
        false
    }

    /// Merge a partial update. Terminal records and backwards transitions are
    /// left untouched. Returns whether the update was applied.
    pub fn apply(&mut self, update: RecordUpdate) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match update.status {
            Some(RequestStatus::Pending) => return false,
            Some(status) => self.status = status,
            // an outcome only exists alongside a terminal status
            None => return false,
        }
        if let Some(outcome) = update.outcome {
            self.outcome = Some(outcome);
        }
        true
    }
}

/// Fields a writer wants to change; everything left `None` is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub status: Option<RequestStatus>,
    pub outcome: Option<DispatchOutcome>,
}

impl RecordUpdate {
    #[must_use]
    pub fn status(status: RequestStatus) -> Self {
        Self { status: Some(status), outcome: None }
    }

    #[must_use]
    pub fn completed(outcome: DispatchOutcome) -> Self {
        Self { status: Some(RequestStatus::Completed), outcome: Some(outcome) }
    }

    #[must_use]
    pub fn failed(outcome: DispatchOutcome) -> Self {
        Self { status: Some(RequestStatus::Failed), outcome: Some(outcome) }
    }
}
