// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::time::Duration;
use event_listener::{Event, Listener};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe log of values handed to callbacks.
///
/// ```
/// use strand_test_utils::Recorder;
///
/// let recorder = Recorder::new();
/// let on_item = recorder.callback();
/// on_item(1);
/// on_item(2);
/// assert_eq!(recorder.values(), vec![1, 2]);
/// ```
pub struct Recorder<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    values: Mutex<Vec<T>>,
    pushed: Event,
}

impl<T> Recorder<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                values: Mutex::new(Vec::new()),
                pushed: Event::new(),
            }),
        }
    }

    pub fn push(&self, value: T) {
        self.inner.values.lock().push(value);
        self.inner.pushed.notify(usize::MAX);
    }

    pub fn len(&self) -> usize {
        self.inner.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block until at least `len` values were recorded or `timeout` elapses.
    pub fn wait_for_len(&self, len: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.len() >= len {
                return true;
            }

            let listener = self.inner.pushed.listen();

            if self.len() >= len {
                return true;
            }

            if listener.wait_deadline(deadline).is_none() {
                return self.len() >= len;
            }
        }
    }
}

impl<T: Clone> Recorder<T> {
    pub fn values(&self) -> Vec<T> {
        self.inner.values.lock().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.inner.values.lock().last().cloned()
    }
}

impl<T: Send + 'static> Recorder<T> {
    /// A callback that records its argument.
    pub fn callback(&self) -> impl Fn(T) + Clone + Send + Sync + 'static {
        let recorder = self.clone();
        move |value| recorder.push(value)
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
