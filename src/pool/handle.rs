//! Task handles
//!
//! The future-like result of a submitted task.

use crossbeam::channel::{Receiver, TryRecvError};

use crate::error::{RecordError, Result};

use super::Slot;

/// Pending result of a task submitted to the [`super::WorkerPool`]
///
/// Consumed by [`wait`](Self::wait) or [`wait_or_run`](Self::wait_or_run).
/// Continuations are chained with [`map`](Self::map) /
/// [`and_then`](Self::and_then) and run on the waiting thread.
#[must_use = "a task handle does nothing unless waited on"]
pub struct TaskHandle<T> {
    state: State<T>,
}

enum State<T> {
    /// Already resolved (fast-fail paths, fixed replies)
    Ready(Result<T>),

    /// Queued or running on the pool
    Queued {
        result: Receiver<Result<T>>,
        slot: Slot,
    },

    /// Continuation over another handle
    Chained(Box<dyn FnOnce(bool) -> Result<T> + Send>),
}

impl<T: Send + 'static> TaskHandle<T> {
    /// A handle that is already resolved
    pub fn ready(result: Result<T>) -> Self {
        Self {
            state: State::Ready(result),
        }
    }

    pub(super) fn queued(result: Receiver<Result<T>>, slot: Slot) -> Self {
        Self {
            state: State::Queued { result, slot },
        }
    }

    /// Block until the task finishes
    pub fn wait(self) -> Result<T> {
        self.resolve(false)
    }

    /// Block until the task finishes, running it on this thread if no worker
    /// has picked it up yet
    ///
    /// Used by tasks that fan out onto the pool they are running on, so a
    /// fully busy pool cannot starve them.
    pub fn wait_or_run(self) -> Result<T> {
        self.resolve(true)
    }

    /// True if [`wait`](Self::wait) would return without blocking
    ///
    /// A queued task that finished, or was dropped by a forced shutdown, is
    /// resolved in place. Chained handles report `false` until waited on.
    pub fn is_ready(&mut self) -> bool {
        let polled = match &self.state {
            State::Ready(_) => return true,
            State::Chained(_) => return false,
            State::Queued { result, .. } => match result.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => Err(aborted()),
            },
        };
        self.state = State::Ready(polled);
        true
    }

    /// Chain an infallible continuation
    pub fn map<U, F>(self, f: F) -> TaskHandle<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        TaskHandle {
            state: State::Chained(Box::new(move |run_inline| self.resolve(run_inline).map(f))),
        }
    }

    /// Chain a fallible continuation
    pub fn and_then<U, F>(self, f: F) -> TaskHandle<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        TaskHandle {
            state: State::Chained(Box::new(move |run_inline| {
                self.resolve(run_inline).and_then(f)
            })),
        }
    }

    fn resolve(self, run_inline: bool) -> Result<T> {
        match self.state {
            State::Ready(result) => result,
            State::Queued { result, slot } => {
                if run_inline {
                    let job = slot.lock().take();
                    if let Some(job) = job {
                        job();
                    }
                }
                result.recv().unwrap_or_else(|_| Err(aborted()))
            }
            State::Chained(resolve) => resolve(run_inline),
        }
    }
}

fn aborted() -> RecordError {
    RecordError::TaskAborted("task was dropped before it completed".to_string())
}

impl<T> std::fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Ready(_) => "ready",
            State::Queued { .. } => "queued",
            State::Chained(_) => "chained",
        };
        f.debug_struct("TaskHandle").field("state", &state).finish()
    }
}
