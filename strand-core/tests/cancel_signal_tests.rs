// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::FutureExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use strand_core::CancelSignal;

#[test]
fn test_new_signal_not_cancelled() {
    let signal = CancelSignal::new();
    assert!(!signal.is_cancelled());
}

#[test]
fn test_cancel_is_idempotent() {
    let signal = CancelSignal::default();
    signal.cancel();
    signal.cancel();
    assert!(signal.is_cancelled());
}

#[test]
fn test_clone_shares_state() {
    let signal = CancelSignal::new();
    let other = signal.clone();

    other.cancel();

    assert!(signal.is_cancelled());
}

#[test]
fn test_wait_timeout_elapses_when_not_cancelled() {
    let signal = CancelSignal::new();
    let started = Instant::now();

    let cancelled = signal.wait_timeout(Duration::from_millis(20));

    assert!(!cancelled);
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[test]
fn test_wait_timeout_returns_immediately_when_cancelled() {
    let signal = CancelSignal::new();
    signal.cancel();

    let started = Instant::now();
    assert!(signal.wait_timeout(Duration::from_secs(10)));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_wait_timeout_wakes_on_cancel_from_other_thread() {
    // Arrange
    let signal = CancelSignal::new();
    let worker_signal = signal.clone();
    let started = Instant::now();

    // Act
    let worker = thread::spawn(move || worker_signal.wait_timeout(Duration::from_secs(10)));
    thread::sleep(Duration::from_millis(10));
    signal.cancel();

    // Assert
    assert!(worker.join().expect("worker thread"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_polling_producer_stops_within_one_boundary() {
    // Arrange
    let signal = CancelSignal::new();
    let produced = Arc::new(AtomicUsize::new(0));
    let worker_signal = signal.clone();
    let worker_count = produced.clone();

    // Act
    let worker = thread::spawn(move || {
        while !worker_signal.is_cancelled() {
            worker_count.fetch_add(1, Ordering::SeqCst);
            worker_signal.wait_timeout(Duration::from_millis(1));
        }
    });
    thread::sleep(Duration::from_millis(20));
    signal.cancel();
    worker.join().expect("worker thread");
    let after_stop = produced.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(10));

    // Assert
    assert!(after_stop > 0);
    assert_eq!(produced.load(Ordering::SeqCst), after_stop);
}

#[test]
fn test_cancelled_future_pending_until_cancel() {
    let signal = CancelSignal::new();

    assert!(signal.cancelled().now_or_never().is_none());

    signal.cancel();

    assert!(signal.cancelled().now_or_never().is_some());
}

#[tokio::test]
async fn test_cancelled_future_wakes_spawned_task() {
    let signal = CancelSignal::new();
    let waiter = signal.clone();

    let handle = tokio::spawn(async move {
        waiter.cancelled().await;
        true
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    signal.cancel();

    let woke = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("task should wake")
        .expect("task should not panic");
    assert!(woke);
}
