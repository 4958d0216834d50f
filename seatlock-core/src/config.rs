use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SEAT_COUNT: u32 = 10;
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_millis(60_000);
/// Slack added to the expiry timer so the deadline check inside the
/// callback, not the wake-up time, decides whether the lock lapsed.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_millis(100);
/// Longest lock the registry will configure.
pub const MAX_LOCK_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("seat_count must be greater than 0")]
    NoSeats,
    #[error("lock_ttl must be greater than 0")]
    ZeroTtl,
    #[error("lock_ttl must not exceed {} ms", MAX_LOCK_TTL.as_millis())]
    TtlTooLong,
    #[error("a tokio runtime is required to schedule lock expiry")]
    NoRuntime,
}

/// Registry sizing and lock timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Seats are numbered `1..=seat_count`
    pub seat_count: u32,
    /// Applied uniformly to every lock
    pub lock_ttl: Duration,
    pub expiry_margin: Duration,
}

impl RegistryConfig {
    pub fn new(seat_count: u32, lock_ttl: Duration) -> Self {
        Self {
            seat_count,
            lock_ttl,
            ..Self::default()
        }
    }

    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seat_count == 0 {
            return Err(ConfigError::NoSeats);
        }
        if self.lock_ttl.is_zero() {
            return Err(ConfigError::ZeroTtl);
        }
        if self.lock_ttl > MAX_LOCK_TTL {
            return Err(ConfigError::TtlTooLong);
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seat_count: DEFAULT_SEAT_COUNT,
            lock_ttl: DEFAULT_LOCK_TTL,
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
        }
    }
}
