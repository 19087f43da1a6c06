//! Typed error enum for webhook delivery.

use hookrelay_core::DispatchOutcome;
use thiserror::Error;

/// Errors from a single webhook delivery attempt.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}")]
    HttpStatus { code: u16, outcome: Box<DispatchOutcome> },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl WebhookError {
    /// Status code to record for this failure, `0` when none was received.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::HttpRequest(e) => e.status().map_or(0, |s| s.as_u16()),
            Self::HttpStatus { code, .. } => *code,
            Self::ClientInit(_) => 0,
        }
    }

    /// Whether the endpoint might accept the same message later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::ClientInit(_) => false,
        }
    }

    /// The outcome to store for this failure. Non-2xx responses keep what the
    /// endpoint sent; transport failures get a synthesized outcome.
    #[must_use]
    pub fn into_outcome(self) -> DispatchOutcome {
        match self {
            Self::HttpStatus { outcome, .. } => *outcome,
            other => {
                let code = other.status_code();
                DispatchOutcome { status_code: code, ..DispatchOutcome::unreachable(other.to_string()) }
            },
        }
    }
}
