//! Pairing session tuning

use std::time::Duration;

/// Overall deadline for one handover attempt
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);
/// Backoff before re-bonding after a recoverable bond failure
pub const DEFAULT_RETRY_PAIRING_WAIT: Duration = Duration::from_secs(2);
/// Backoff before retrying profile connections
pub const DEFAULT_RETRY_CONNECT_WAIT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_RETRY_COUNT: u32 = 3;

/// Timing and retry policy for a pairing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverConfig {
    /// Deadline armed at start and re-armed when the user allows pairing
    pub timeout: Duration,
    pub retry_pairing_wait: Duration,
    pub retry_connect_wait: Duration,
    /// Retries allowed for bonding and for connecting, counted separately
    pub max_retry_count: u32,
    /// Resume media playback after an audio sink connects even if nothing was playing
    pub auto_play: bool,
}

impl Default for HandoverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_pairing_wait: DEFAULT_RETRY_PAIRING_WAIT,
            retry_connect_wait: DEFAULT_RETRY_CONNECT_WAIT,
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            auto_play: false,
        }
    }
}
