// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use strand_core::{StrandError, TaskHandle, TaskState, WorkerPool};
use strand_runtime::{InlinePool, TokioPool};

#[test]
fn test_inline_pool_runs_job_before_returning() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    InlinePool
        .execute(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("inline pool never rejects");

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_inline_pool_runs_on_caller_thread() {
    let caller = thread::current().id();
    let (tx, rx) = std::sync::mpsc::channel();

    let handle = TaskHandle::submit(&InlinePool, move || {
        tx.send(thread::current().id()).expect("send thread id");
    })
    .expect("submit");

    assert_eq!(handle.state(), TaskState::Finished);
    assert_eq!(rx.recv().expect("thread id"), caller);
}

#[test]
fn test_tokio_pool_outside_runtime_is_unavailable() {
    let result = TokioPool::current();

    assert!(matches!(result, Err(StrandError::RuntimeUnavailable { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_pool_runs_off_the_calling_thread() -> anyhow::Result<()> {
    // Arrange
    let pool = TokioPool::current()?;
    let caller = thread::current().id();
    let (tx, rx) = std::sync::mpsc::channel();

    // Act
    let handle = TaskHandle::submit(&pool, move || {
        tx.send(thread::current().id()).expect("send thread id");
    })?;
    let state = tokio::time::timeout(Duration::from_secs(5), handle.settled()).await?;

    // Assert
    assert_eq!(state, TaskState::Finished);
    assert_ne!(rx.recv()?, caller);
    Ok(())
}

#[test]
fn test_tokio_pool_from_explicit_handle() -> anyhow::Result<()> {
    // Arrange
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()?;
    let pool = TokioPool::new(runtime.handle().clone());
    let hits = Arc::new(AtomicUsize::new(0));

    // Act
    let handles: Vec<TaskHandle> = (0..8)
        .map(|_| {
            let counter = hits.clone();
            TaskHandle::submit(&pool, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect::<Result<_, _>>()?;

    // Assert
    for handle in &handles {
        assert_eq!(handle.wait_timeout(Duration::from_secs(5)), Some(TaskState::Finished));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 8);
    Ok(())
}
