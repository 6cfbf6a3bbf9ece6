// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Thread-safe "latest item" cell.
//!
//! Unlike a channel, reading does not consume: any number of readers observe
//! the same most recent value. Every [`set`](LatestValue::set) bumps a version
//! counter, so a reader can tell whether anything changed since it last looked.

use core::fmt;
use core::time::Duration;
use event_listener::{Event, Listener};
use parking_lot::Mutex;
use std::time::Instant;

/// Holds the most recently published value together with its version.
///
/// Version `0` means nothing has been published yet.
///
/// ```
/// use strand_core::LatestValue;
///
/// let cell = LatestValue::new();
/// assert_eq!(cell.get(), None);
///
/// assert_eq!(cell.set("first"), 1);
/// assert_eq!(cell.set("second"), 2);
///
/// assert_eq!(cell.get(), Some("second"));
/// assert_eq!(cell.version(), 2);
/// ```
pub struct LatestValue<T> {
    slot: Mutex<Slot<T>>,
    changed: Event,
}

struct Slot<T> {
    value: Option<T>,
    version: u64,
}

impl<T> LatestValue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                version: 0,
            }),
            changed: Event::new(),
        }
    }

    /// Replace the value, wake waiters and return the new version.
    pub fn set(&self, value: T) -> u64 {
        let version = {
            let mut slot = self.slot.lock();
            slot.value = Some(value);
            slot.version += 1;
            slot.version
        };
        self.changed.notify(usize::MAX);
        version
    }

    pub fn version(&self) -> u64 {
        self.slot.lock().version
    }
}

impl<T: Clone> LatestValue<T> {
    /// Clone the current value without consuming it.
    pub fn get(&self) -> Option<T> {
        self.slot.lock().value.clone()
    }

    /// Current version and value, read atomically.
    pub fn snapshot(&self) -> (u64, Option<T>) {
        let slot = self.slot.lock();
        (slot.version, slot.value.clone())
    }

    /// Block until the version exceeds `seen` or `timeout` elapses.
    ///
    /// Returns the new version and value, or `None` on timeout.
    pub fn wait_newer(&self, seen: u64, timeout: Duration) -> Option<(u64, T)> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(newer) = self.newer_than(seen) {
                return Some(newer);
            }

            let listener = self.changed.listen();

            if let Some(newer) = self.newer_than(seen) {
                return Some(newer);
            }

            if listener.wait_deadline(deadline).is_none() {
                return self.newer_than(seen);
            }
        }
    }

    /// Wait asynchronously until the version exceeds `seen`.
    pub async fn changed(&self, seen: u64) -> (u64, T) {
        loop {
            if let Some(newer) = self.newer_than(seen) {
                return newer;
            }

            let listener = self.changed.listen();

            if let Some(newer) = self.newer_than(seen) {
                return newer;
            }

            listener.await;
        }
    }

    fn newer_than(&self, seen: u64) -> Option<(u64, T)> {
        let slot = self.slot.lock();
        if slot.version > seen {
            slot.value.clone().map(|value| (slot.version, value))
        } else {
            None
        }
    }
}

impl<T> Default for LatestValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LatestValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("LatestValue")
            .field("version", &slot.version)
            .field("value", &slot.value)
            .finish()
    }
}
