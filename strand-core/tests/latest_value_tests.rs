// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use strand_core::LatestValue;

#[test]
fn test_empty_cell_has_version_zero() {
    let cell: LatestValue<u32> = LatestValue::new();

    assert_eq!(cell.version(), 0);
    assert_eq!(cell.get(), None);
    assert_eq!(cell.snapshot(), (0, None));
}

#[test]
fn test_reads_do_not_consume() {
    let cell = LatestValue::new();
    cell.set(String::from("frame-1"));

    assert_eq!(cell.get().as_deref(), Some("frame-1"));
    assert_eq!(cell.get().as_deref(), Some("frame-1"));
}

#[test]
fn test_each_set_bumps_version() {
    let cell = LatestValue::new();

    let versions: Vec<u64> = (0..4).map(|i| cell.set(i)).collect();

    assert_eq!(versions, vec![1, 2, 3, 4]);
    assert_eq!(cell.snapshot(), (4, Some(3)));
}

#[test]
fn test_wait_newer_returns_immediately_when_already_newer() {
    let cell = LatestValue::new();
    cell.set(10);
    cell.set(11);

    assert_eq!(cell.wait_newer(1, Duration::from_millis(1)), Some((2, 11)));
}

#[test]
fn test_wait_newer_times_out_without_change() {
    let cell = LatestValue::new();
    let seen = cell.set(1);

    assert_eq!(cell.wait_newer(seen, Duration::from_millis(10)), None);
}

#[test]
fn test_wait_newer_wakes_on_set_from_other_thread() {
    // Arrange
    let cell = Arc::new(LatestValue::new());
    let seen = cell.set(0);
    let writer_cell = cell.clone();

    // Act
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        writer_cell.set(42);
    });
    let observed = cell.wait_newer(seen, Duration::from_secs(5));
    writer.join().expect("writer thread");

    // Assert
    assert_eq!(observed, Some((2, 42)));
}

#[tokio::test]
async fn test_changed_resolves_on_newer_version() -> anyhow::Result<()> {
    let cell = Arc::new(LatestValue::new());
    let writer_cell = cell.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        writer_cell.set("ready");
    });

    let (version, value) = tokio::time::timeout(Duration::from_secs(1), cell.changed(0)).await?;

    assert_eq!(version, 1);
    assert_eq!(value, "ready");
    Ok(())
}
