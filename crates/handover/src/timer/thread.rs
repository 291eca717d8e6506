use super::{Scheduler, TimerId, TimerTask};
use log::{debug, warn};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Default)]
struct State {
    queue: BinaryHeap<Reverse<(Instant, u64)>>,
    tasks: HashMap<u64, TimerTask>,
    next_id: u64,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    wakeup: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs timer tasks on a dedicated worker thread.
///
/// Tasks run one at a time, outside the scheduler lock, so a task may schedule or
/// cancel further timers. Dropping the scheduler discards pending tasks and joins the
/// worker.
pub struct ThreadScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadScheduler {
    pub fn new() -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::default()),
            wakeup: Condvar::new(),
        });

        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("handover-timer".into())
            .spawn(move || run_worker(&worker_shared))?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }
}

fn run_worker(shared: &Shared) {
    let mut state = shared.lock();
    loop {
        if state.shutdown {
            return;
        }

        let next = state.queue.peek().map(|Reverse(entry)| *entry);
        match next {
            None => {
                state = shared
                    .wakeup
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            Some((deadline, id)) => {
                let now = Instant::now();
                if deadline > now {
                    state = shared
                        .wakeup
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                    continue;
                }

                state.queue.pop();
                // Cancelled tasks leave their queue entry behind
                if let Some(task) = state.tasks.remove(&id) {
                    drop(state);
                    task();
                    state = shared.lock();
                }
            }
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerId {
        let mut state = self.shared.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.queue.push(Reverse((Instant::now() + delay, id)));
        state.tasks.insert(id, task);
        drop(state);

        self.shared.wakeup.notify_one();
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.shared.lock().tasks.remove(&id.0).is_some()
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            if !state.tasks.is_empty() {
                debug!("Discarding {} pending timer tasks", state.tasks.len());
            }
            state.tasks.clear();
        }
        self.shared.wakeup.notify_all();

        if let Some(worker) = self.worker.take() {
            // A task dropping the last handle would otherwise join itself
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!("Timer worker panicked");
            }
        }
    }
}
