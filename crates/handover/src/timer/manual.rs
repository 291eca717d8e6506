use super::{Scheduler, TimerId, TimerTask};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct State {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), TimerTask>,
    due: HashMap<u64, Duration>,
}

/// A scheduler on a virtual clock.
///
/// Nothing runs until [`advance`](ManualScheduler::advance) moves the clock; due tasks
/// then run on the calling thread in deadline order.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<State>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time elapsed on the virtual clock
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks still waiting to run
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Moves the clock forward by `by`, running every task that falls due. Tasks
    /// scheduled by a running task run too if they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;
        loop {
            let mut state = self.lock();
            let Some(&(when, id)) = state.queue.keys().next() else {
                break;
            };
            if when > target {
                break;
            }

            let task = state.queue.remove(&(when, id));
            state.due.remove(&id);
            state.now = when;
            drop(state);

            if let Some(task) = task {
                task();
            }
        }
        self.lock().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerId {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let when = state.now + delay;
        state.queue.insert((when, id), task);
        state.due.insert(id, when);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut state = self.lock();
        match state.due.remove(&id.0) {
            Some(when) => state.queue.remove(&(when, id.0)).is_some(),
            None => false,
        }
    }
}
