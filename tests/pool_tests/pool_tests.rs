//! Tests for WorkerPool and TaskHandle
//!
//! These tests verify:
//! - Tasks run on worker threads and deliver results
//! - Continuations (map / and_then)
//! - Panics are contained per task
//! - Nested submission from a saturated pool (wait_or_run)
//! - Graceful and forced shutdown

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use recorddb::pool::{TaskHandle, WorkerPool};
use recorddb::RecordError;

// =============================================================================
// Basic Tests
// =============================================================================

#[test]
fn test_pool_rejects_zero_size() {
    assert!(matches!(WorkerPool::new(0), Err(RecordError::WorkerPool(_))));
}

#[test]
fn test_submit_and_wait() {
    let pool = WorkerPool::new(2).unwrap();

    let handle = pool.submit(|| Ok(21 * 2)).unwrap();
    assert_eq!(handle.wait().unwrap(), 42);
}

#[test]
fn test_task_runs_on_worker_thread() {
    let pool = WorkerPool::new(1).unwrap();

    let name = pool
        .submit(|| Ok(thread::current().name().map(str::to_string)))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(name.as_deref(), Some("recorddb-worker-0"));
}

#[test]
fn test_task_error_is_returned() {
    let pool = WorkerPool::new(1).unwrap();

    let result: Result<(), _> = pool.submit(|| Err(RecordError::Stopped)).unwrap().wait();
    assert!(matches!(result, Err(RecordError::Stopped)));
}

#[test]
fn test_many_tasks_all_complete() {
    let pool = WorkerPool::new(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap()
        })
        .collect();

    for handle in handles {
        handle.wait().unwrap();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 100);
}

// =============================================================================
// Continuation Tests
// =============================================================================

#[test]
fn test_map_and_then() {
    let pool = WorkerPool::new(2).unwrap();

    let handle = pool
        .submit(|| Ok(vec!["b".to_string(), "a".to_string()]))
        .unwrap()
        .map(|mut ids| {
            ids.sort();
            ids
        })
        .and_then(|ids| Ok(ids.join(",")));

    assert_eq!(handle.wait().unwrap(), "a,b");
}

#[test]
fn test_ready_handle() {
    let mut handle = TaskHandle::ready(Ok("done".to_string()));
    assert!(handle.is_ready());
    assert_eq!(handle.map(|s| s.len()).wait().unwrap(), 4);
}

#[test]
fn test_queued_handle_becomes_ready() {
    let pool = WorkerPool::new(1).unwrap();
    let mut handle = pool.submit(|| Ok(5)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.is_ready() {
        assert!(Instant::now() < deadline, "task never completed");
        thread::sleep(Duration::from_millis(1));
    }

    // Polling caches the result; it is not lost
    assert!(handle.is_ready());
    assert_eq!(handle.wait().unwrap(), 5);
}

#[test]
fn test_and_then_propagates_error() {
    let handle: TaskHandle<u32> = TaskHandle::ready(Err(RecordError::Stopped));
    let chained = handle.and_then(|n| Ok(n + 1));

    assert!(matches!(chained.wait(), Err(RecordError::Stopped)));
}

// =============================================================================
// Panic Tests
// =============================================================================

#[test]
fn test_panicking_task_is_contained() {
    let pool = WorkerPool::new(1).unwrap();

    let panicked: TaskHandle<()> = pool.submit(|| panic!("boom")).unwrap();
    assert!(matches!(panicked.wait(), Err(RecordError::TaskAborted(_))));

    // The single worker is still alive
    assert_eq!(pool.submit(|| Ok(1)).unwrap().wait().unwrap(), 1);
}

// =============================================================================
// Nested Submission Tests
// =============================================================================

#[test]
fn test_nested_tasks_on_single_worker_complete() {
    let pool = Arc::new(WorkerPool::new(1).unwrap());
    let inner_pool = Arc::clone(&pool);

    // The outer task occupies the only worker; its children can only run
    // because wait_or_run claims them
    let outer = pool
        .submit(move || {
            let children: Vec<_> = (0..5)
                .map(|i| inner_pool.submit(move || Ok(i * 10)).unwrap())
                .collect();
            children
                .into_iter()
                .map(|child| child.wait_or_run())
                .collect::<Result<Vec<_>, _>>()
        })
        .unwrap();

    assert_eq!(outer.wait().unwrap(), vec![0, 10, 20, 30, 40]);
}

#[test]
fn test_wait_or_run_claims_unstarted_task() {
    let pool = WorkerPool::new(1).unwrap();
    let gate = Arc::new(Barrier::new(2));

    // Park the only worker
    let blocker = {
        let gate = Arc::clone(&gate);
        pool.submit(move || {
            gate.wait();
            Ok(())
        })
        .unwrap()
    };

    let queued = pool
        .submit(|| Ok(thread::current().name().map(str::to_string)))
        .unwrap();
    let ran_on = queued.wait_or_run().unwrap();

    // Ran here, on the test thread, not on the parked worker
    assert_ne!(ran_on.as_deref(), Some("recorddb-worker-0"));

    gate.wait();
    blocker.wait().unwrap();
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_shutdown_drains_queued_work() {
    let pool = WorkerPool::new(2).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                thread::sleep(Duration::from_millis(1));
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap()
        })
        .collect();

    assert!(pool.shutdown(Duration::from_secs(5)));
    assert!(pool.is_shutdown());
    assert_eq!(counter.load(Ordering::SeqCst), 20);

    for handle in handles {
        handle.wait().unwrap();
    }
}

#[test]
fn test_submit_after_shutdown_fails() {
    let pool = WorkerPool::new(1).unwrap();
    assert!(pool.shutdown(Duration::from_secs(1)));

    assert!(matches!(pool.submit(|| Ok(())), Err(RecordError::WorkerPool(_))));
}

#[test]
fn test_shutdown_is_idempotent() {
    let pool = WorkerPool::new(2).unwrap();

    assert!(pool.shutdown(Duration::from_secs(1)));
    assert!(pool.shutdown(Duration::from_secs(1)));
}

#[test]
fn test_forced_shutdown_aborts_queued_tasks() {
    let pool = WorkerPool::new(1).unwrap();
    let gate = Arc::new(Barrier::new(2));
    let (started_tx, started_rx) = mpsc::channel();

    let blocker = {
        let gate = Arc::clone(&gate);
        pool.submit(move || {
            started_tx.send(()).unwrap();
            gate.wait();
            Ok(())
        })
        .unwrap()
    };
    let mut queued = pool.submit(|| Ok(())).unwrap();
    assert!(!queued.is_ready());

    // Make sure the worker is busy before shutting down
    started_rx.recv().unwrap();

    let started = Instant::now();
    assert!(!pool.shutdown(Duration::from_millis(100)));
    assert!(started.elapsed() >= Duration::from_millis(100));

    // Never started, dropped by the forced shutdown
    assert!(queued.is_ready());
    assert!(matches!(queued.wait(), Err(RecordError::TaskAborted(_))));

    // The busy task still finishes once released
    gate.wait();
    blocker.wait().unwrap();
}
