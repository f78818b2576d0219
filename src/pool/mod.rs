//! Worker Pool Module
//!
//! Fixed-size thread pool that runs storage operations and hands callers a
//! [`TaskHandle`] to wait on.
//!
//! ## Architecture
//! - N worker threads share one crossbeam queue of job slots
//! - Each submission gets a one-shot result channel
//! - A job slot is claimed exactly once: by a worker, or by a caller that
//!   would otherwise block on it (see [`TaskHandle::wait_or_run`])
//!
//! ## Shutdown
//! `shutdown(grace)` closes the queue, lets workers drain what is already
//! queued, and waits up to `grace`. Past the deadline remaining queued jobs
//! are dropped (their handles resolve to `TaskAborted`) and busy workers are
//! detached.

mod handle;
mod worker;

use std::sync::Arc;

use parking_lot::Mutex;

pub use handle::TaskHandle;
pub use worker::WorkerPool;

/// Type-erased unit of work
type Job = Box<dyn FnOnce() + Send + 'static>;

/// A queued job, taken by whoever claims it first
type Slot = Arc<Mutex<Option<Job>>>;
