use std::time::Duration;

use crate::constants::{
    DEFAULT_DISPATCH_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SWEEP_INTERVAL_SECS,
    DEFAULT_TTL_SECS, DEFAULT_WAIT_TIMEOUT_SECS,
};

/// Tunables for the relay. Plain values; reading them from the environment
/// is left to the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Lifetime of every record, fixed at creation.
    pub ttl: Duration,
    /// How often expired records are deleted.
    pub sweep_interval: Duration,
    /// Recheck interval for waits on ids the store does not (yet) hold.
    pub poll_interval: Duration,
    /// Default and maximum wait for a synchronous send.
    pub wait_timeout: Duration,
    /// HTTP timeout for the webhook call itself.
    pub dispatch_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            dispatch_timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
        }
    }
}

impl RelayConfig {
    /// Clamp a caller-requested wait to the configured maximum.
    #[must_use]
    pub fn effective_wait(&self, requested: Option<Duration>) -> Duration {
        requested.map_or(self.wait_timeout, |d| d.min(self.wait_timeout))
    }
}
