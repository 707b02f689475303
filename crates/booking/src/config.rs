//! Engine configuration loaded from environment variables.

use std::time::Duration;

/// Tunables for the booking engine.
///
/// Reads from environment variables:
/// - `BOOKING_RELEASE_RETRIES` — compensating-release retry attempts (default: `3`)
/// - `BOOKING_RELEASE_RETRY_DELAY_MS` — delay between retries (default: `50`)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many times a failed compensating release is retried before
    /// the failure is logged and given up on.
    pub release_retry_attempts: u32,

    /// Delay between compensating-release retries.
    pub release_retry_delay: Duration,
}

impl EngineConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            release_retry_attempts: std::env::var("BOOKING_RELEASE_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            release_retry_delay: std::env::var("BOOKING_RELEASE_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_millis(50)),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            release_retry_attempts: 3,
            release_retry_delay: Duration::from_millis(50),
        }
    }
}
