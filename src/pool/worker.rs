//! Worker threads
//!
//! Owns the job queue and the threads draining it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{RecordError, Result};

use super::{Job, Slot, TaskHandle};

/// Fixed-size pool of worker threads
///
/// ## Concurrency:
/// - `sender`: `None` once shutdown has begun; submissions then fail
/// - `abort`: set when the grace period expires, workers drop jobs unrun
/// - All methods use `&self`, the pool is shared behind an `Arc`
pub struct WorkerPool {
    /// Queue entry point (taken on shutdown)
    sender: Mutex<Option<Sender<Slot>>>,

    /// Kept so a forced shutdown can drain jobs nobody will run
    queue: Receiver<Slot>,

    /// Join handles of live workers
    workers: Mutex<Vec<JoinHandle<()>>>,

    /// Each worker reports its id here on exit
    exited: Receiver<usize>,

    /// Forced-shutdown flag
    abort: Arc<AtomicBool>,

    size: usize,
}

impl WorkerPool {
    /// Spawn a pool of `size` named worker threads
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(RecordError::WorkerPool(
                "pool size must be at least 1".to_string(),
            ));
        }

        let (sender, queue) = channel::unbounded::<Slot>();
        let (exit_tx, exited) = channel::unbounded::<usize>();
        let abort = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let queue = queue.clone();
            let exit_tx = exit_tx.clone();
            let abort = Arc::clone(&abort);

            let handle = thread::Builder::new()
                .name(format!("recorddb-worker-{}", id))
                .spawn(move || worker_loop(id, queue, abort, exit_tx))
                .map_err(|e| RecordError::WorkerPool(format!("failed to spawn worker {}: {}", id, e)))?;

            workers.push(handle);
        }

        tracing::debug!("Worker pool started with {} threads", size);

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            queue,
            workers: Mutex::new(workers),
            exited,
            abort,
            size,
        })
    }

    /// Queue a task and return a handle to its result
    ///
    /// A panicking task resolves to `TaskAborted`; the worker survives.
    /// Fails with `WorkerPool` once shutdown has begun.
    pub fn submit<T, F>(&self, task: F) -> Result<TaskHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (result_tx, result_rx) = channel::bounded(1);

        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|_| {
                Err(RecordError::TaskAborted("task panicked".to_string()))
            });
            // Receiver may be gone if the caller dropped its handle
            let _ = result_tx.send(outcome);
        });
        let slot: Slot = Arc::new(Mutex::new(Some(job)));

        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(tx) if tx.send(Arc::clone(&slot)).is_ok() => {
                Ok(TaskHandle::queued(result_rx, slot))
            }
            _ => Err(RecordError::WorkerPool(
                "worker pool is shut down".to_string(),
            )),
        }
    }

    /// Stop accepting work, drain the queue, and join the workers
    ///
    /// Waits at most `grace`. Returns `true` if every worker exited in time,
    /// `false` if the shutdown had to be forced. Calling it again is a no-op.
    pub fn shutdown(&self, grace: Duration) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            return true;
        };
        // Closing the queue lets workers exit once it is empty
        drop(sender);

        let workers = std::mem::take(&mut *self.workers.lock());
        let deadline = Instant::now() + grace;

        let mut exited = 0;
        while exited < workers.len() {
            match self.exited.recv_deadline(deadline) {
                Ok(_) => exited += 1,
                Err(_) => break,
            }
        }

        if exited == workers.len() {
            for handle in workers {
                let _ = handle.join();
            }
            tracing::debug!("Worker pool drained cleanly");
            return true;
        }

        self.abort.store(true, Ordering::Release);
        let mut dropped = 0;
        while let Ok(slot) = self.queue.try_recv() {
            if slot.lock().take().is_some() {
                dropped += 1;
            }
        }

        tracing::warn!(
            "Worker pool did not drain within {:?}: {} worker(s) still busy, {} queued task(s) dropped",
            grace,
            workers.len() - exited,
            dropped
        );

        // Busy workers are detached; they exit after their current job
        drop(workers);
        false
    }

    /// True once shutdown has begun
    pub fn is_shutdown(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Number of worker threads the pool was started with
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Close the queue; idle workers exit on their own
        self.sender.lock().take();
    }
}

fn worker_loop(id: usize, queue: Receiver<Slot>, abort: Arc<AtomicBool>, exited: Sender<usize>) {
    tracing::trace!("Worker {} started", id);

    for slot in queue.iter() {
        let Some(job) = slot.lock().take() else {
            // Claimed by a waiting caller
            continue;
        };

        if abort.load(Ordering::Acquire) {
            drop(job);
            continue;
        }

        job();
    }

    tracing::trace!("Worker {} exiting", id);
    let _ = exited.send(id);
}
