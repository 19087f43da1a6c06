//! Shared constants for hookrelay.

/// Lifetime of a request record, measured from creation.
pub const DEFAULT_TTL_SECS: u64 = 1800;

/// Interval between expiry sweeps of the lifecycle store.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 900;

/// Recheck interval used by the completion waiter when no record is present.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Upper bound on how long a caller may wait for a dispatch to finish.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 300;

/// Request timeout for the outbound webhook call.
pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 30;

/// Maximum message length accepted by common chat webhooks.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Maximum display name length accepted by common chat webhooks.
pub const MAX_USERNAME_CHARS: usize = 80;
