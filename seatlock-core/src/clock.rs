//! Time source for lock deadlines.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

/// Supplies the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall-clock epoch anchored once, then advanced by tokio's monotonic clock.
///
/// Deadlines and timer sleeps share one time base, so paused tokio time in
/// tests moves both together.
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin_ms: u64,
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        let origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            origin_ms,
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        self.origin_ms + self.origin.elapsed().as_millis() as u64
    }
}
