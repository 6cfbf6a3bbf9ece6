// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use strand_core::EventBus;
use strand_exec::{subscribe_on, RunOptions, TaskRunner};
use strand_runtime::InlinePool;
use strand_test_utils::{ManualPool, Recorder, TestError};

#[test]
fn test_handler_runs_on_the_pool_not_the_publisher() {
    // Arrange
    let bus = EventBus::<u32>::new();
    let pool = ManualPool::new();
    let runner: TaskRunner = TaskRunner::new(pool.clone());
    let seen = Recorder::new();
    let sink = seen.clone();
    let _subscription = subscribe_on(
        &bus,
        "scan",
        &runner,
        move |value| {
            sink.push(value);
            Ok::<_, TestError>(())
        },
        None,
    );

    // Act
    let delivered = bus.publish("scan", &3);

    // Assert
    assert_eq!(delivered, 1);
    assert!(seen.is_empty(), "nothing runs on the publisher thread");
    assert_eq!(pool.run_all(), 1);
    assert_eq!(seen.values(), vec![3]);
}

#[test]
fn test_burst_keeps_only_the_newest_event_under_the_default_key() {
    // Arrange
    let bus = EventBus::<u32>::new();
    let pool = ManualPool::new();
    let runner: TaskRunner = TaskRunner::new(pool.clone());
    let seen = Recorder::new();
    let sink = seen.clone();
    let _subscription = subscribe_on(
        &bus,
        "scan",
        &runner,
        move |value| {
            sink.push(value);
            Ok::<_, TestError>(())
        },
        None,
    );

    // Act
    for value in 1..=3 {
        bus.publish("scan", &value);
    }
    pool.run_all();

    // Assert
    assert_eq!(seen.values(), vec![3], "earlier events were cancelled");
    assert_eq!(runner.generation(&"event:scan".to_string()), 3);
}

#[test]
fn test_options_without_key_fall_back_to_topic_key() {
    let bus = EventBus::<u32>::new();
    let pool = ManualPool::new();
    let runner: TaskRunner = TaskRunner::new(pool.clone());
    let seen = Recorder::new();
    let sink = seen.clone();
    let _subscription = subscribe_on(
        &bus,
        "scan",
        &runner,
        move |value| {
            sink.push(value);
            Ok::<_, TestError>(())
        },
        Some(RunOptions::new().drop_outdated(false)),
    );

    bus.publish("scan", &1);
    bus.publish("scan", &2);
    pool.run_all();

    assert_eq!(seen.values(), vec![1, 2]);
    assert_eq!(runner.generation(&"event:scan".to_string()), 2);
}

#[test]
fn test_handler_failure_does_not_reach_the_publisher() {
    let bus = EventBus::<u32>::new();
    let runner: TaskRunner = TaskRunner::new(InlinePool);
    let subscription = subscribe_on(
        &bus,
        "scan",
        &runner,
        |_| Err(TestError::new("bad payload")),
        Some(RunOptions::keyed("custom")),
    );

    assert_eq!(bus.publish("scan", &1), 1);
    assert_eq!(runner.generation(&"custom".to_string()), 1);

    subscription.unsubscribe();
    assert_eq!(bus.publish("scan", &2), 0);
}
