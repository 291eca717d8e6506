//! Cancelable delayed callbacks
//!
//! Pairing sessions arm their deadline and retry timers through [`Scheduler`] so tests
//! can drive time by hand with [`ManualScheduler`] while production code uses the
//! worker-thread backed [`ThreadScheduler`].

mod manual;
mod thread;


pub use manual::ManualScheduler;
pub use thread::ThreadScheduler;

use std::time::Duration;

/// Work run when a timer fires
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

pub trait Scheduler: Send + Sync {
    /// Runs `task` once after `delay`
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerId;

    /// Cancels a pending task. Returns `false` if it already ran or was cancelled.
    fn cancel(&self, id: TimerId) -> bool;
}
