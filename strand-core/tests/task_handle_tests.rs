// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use strand_core::{Job, StrandError, TaskHandle, TaskState, WorkerPool};

/// Holds jobs until the test decides to run them.
#[derive(Default)]
struct HeldPool {
    jobs: Mutex<VecDeque<Job>>,
}

impl HeldPool {
    fn run_all(&self) {
        loop {
            let Some(job) = self.jobs.lock().pop_front() else {
                return;
            };
            job();
        }
    }
}

impl WorkerPool for HeldPool {
    fn execute(&self, job: Job) -> strand_core::Result<()> {
        self.jobs.lock().push_back(job);
        Ok(())
    }
}

struct RejectingPool;

impl WorkerPool for RejectingPool {
    fn execute(&self, _job: Job) -> strand_core::Result<()> {
        Err(StrandError::submission_rejected("closed"))
    }
}

struct ThreadPool;

impl WorkerPool for ThreadPool {
    fn execute(&self, job: Job) -> strand_core::Result<()> {
        thread::spawn(job);
        Ok(())
    }
}

#[test]
fn test_submitted_job_is_pending_until_run() {
    // Arrange
    let pool = HeldPool::default();
    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_job = ran.clone();

    // Act
    let handle = TaskHandle::submit(&pool, move || {
        ran_in_job.fetch_add(1, Ordering::SeqCst);
    })
    .expect("submit");

    // Assert
    assert_eq!(handle.state(), TaskState::Pending);
    assert!(!handle.is_settled());

    pool.run_all();

    assert_eq!(handle.state(), TaskState::Finished);
    assert!(handle.is_settled());
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_before_start_skips_body() {
    // Arrange
    let pool = HeldPool::default();
    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_job = ran.clone();
    let handle = TaskHandle::submit(&pool, move || {
        ran_in_job.fetch_add(1, Ordering::SeqCst);
    })
    .expect("submit");

    // Act
    let cancelled = handle.cancel();
    pool.run_all();

    // Assert
    assert!(cancelled);
    assert!(handle.is_cancelled());
    assert_eq!(handle.wait(), TaskState::Cancelled);
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_cancel_after_finish_is_rejected() {
    let pool = HeldPool::default();
    let handle = TaskHandle::submit(&pool, || {}).expect("submit");
    pool.run_all();

    assert!(!handle.cancel());
    assert_eq!(handle.state(), TaskState::Finished);
}

#[test]
fn test_cancel_while_running_is_rejected() {
    // Arrange
    let (entered_tx, entered_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let handle = TaskHandle::submit(&ThreadPool, move || {
        entered_tx.send(()).expect("entered");
        release_rx.recv().expect("release");
    })
    .expect("submit");
    entered_rx.recv().expect("job started");

    // Act
    let cancelled = handle.cancel();
    release_tx.send(()).expect("release job");

    // Assert
    assert!(!cancelled);
    assert_eq!(handle.wait(), TaskState::Finished);
}

#[test]
fn test_hooks_run_once_with_terminal_state() {
    // Arrange
    let pool = HeldPool::default();
    let handle = TaskHandle::submit(&pool, || {}).expect("submit");
    let seen = Arc::new(Mutex::new(Vec::new()));

    for _ in 0..2 {
        let seen = seen.clone();
        handle.on_settled(move |state| seen.lock().push(state));
    }

    // Act
    pool.run_all();

    // Assert
    assert_eq!(*seen.lock(), vec![TaskState::Finished, TaskState::Finished]);
}

#[test]
fn test_hook_attached_after_settle_runs_immediately() {
    let pool = HeldPool::default();
    let handle = TaskHandle::submit(&pool, || {}).expect("submit");
    assert!(handle.cancel());

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    handle.on_settled(move |state| *sink.lock() = Some(state));

    assert_eq!(*seen.lock(), Some(TaskState::Cancelled));
}

#[test]
fn test_hooks_run_on_cancelling_thread() {
    let pool = HeldPool::default();
    let handle = TaskHandle::submit(&pool, || {}).expect("submit");
    let hook_thread = Arc::new(Mutex::new(None));
    let sink = hook_thread.clone();
    handle.on_settled(move |_| *sink.lock() = Some(thread::current().id()));

    handle.cancel();

    assert_eq!(*hook_thread.lock(), Some(thread::current().id()));
}

#[test]
fn test_panicking_body_still_finishes() {
    let pool = HeldPool::default();
    let handle = TaskHandle::submit(&pool, || panic!("job blew up")).expect("submit");

    let outcome = catch_unwind(AssertUnwindSafe(|| pool.run_all()));

    assert!(outcome.is_err());
    assert_eq!(handle.state(), TaskState::Finished);
    assert!(handle.is_settled());
}

#[test]
fn test_rejected_submission_propagates_error() {
    let result = TaskHandle::submit(&RejectingPool, || {});

    assert!(matches!(
        result,
        Err(StrandError::SubmissionRejected { .. })
    ));
}

#[test]
fn test_wait_timeout_on_pending_job() {
    let pool = HeldPool::default();
    let handle = TaskHandle::submit(&pool, || {}).expect("submit");

    assert_eq!(handle.wait_timeout(Duration::from_millis(10)), None);

    pool.run_all();

    assert_eq!(
        handle.wait_timeout(Duration::from_millis(10)),
        Some(TaskState::Finished)
    );
}

#[test]
fn test_waiters_released_after_hooks() {
    // Arrange
    let hook_done = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let handle = TaskHandle::submit(&ThreadPool, move || {
        release_rx.recv().expect("release");
    })
    .expect("submit");
    let marker = hook_done.clone();
    handle.on_settled(move |_| {
        thread::sleep(Duration::from_millis(10));
        marker.store(1, Ordering::SeqCst);
    });

    // Act
    release_tx.send(()).expect("release job");
    let state = handle.wait();

    // Assert
    assert_eq!(state, TaskState::Finished);
    assert_eq!(hook_done.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_settled_future_resolves() -> anyhow::Result<()> {
    let handle = TaskHandle::submit(&ThreadPool, || thread::sleep(Duration::from_millis(5)))?;

    let state = tokio::time::timeout(Duration::from_secs(1), handle.settled()).await?;

    assert_eq!(state, TaskState::Finished);
    Ok(())
}

#[test]
fn test_terminal_states() {
    assert!(TaskState::Finished.is_terminal());
    assert!(TaskState::Cancelled.is_terminal());
    assert!(!TaskState::Pending.is_terminal());
    assert!(!TaskState::Running.is_terminal());
}
