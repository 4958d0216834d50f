//! Cancelable one-shot timers backing automatic lock expiry.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// A scheduled expiry callback for one lock.
///
/// Dropping the timer aborts the task. A callback that already woke up may
/// still run, so callbacks must re-check state before mutating.
#[derive(Debug)]
pub struct ExpiryTimer {
    task: AbortHandle,
    deadline: u64,
}

impl ExpiryTimer {
    /// Spawns `on_fire` on `runtime` after `delay`.
    pub fn arm<F>(runtime: &Handle, delay: Duration, deadline: u64, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });
        Self {
            task: task.abort_handle(),
            deadline,
        }
    }

    /// Lock deadline (epoch ms) this timer was armed for.
    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
