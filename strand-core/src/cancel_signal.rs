// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cooperative cancellation signal shared between a caller and a worker.
//!
//! A producer running on a worker thread cannot be interrupted. Instead it
//! polls a [`CancelSignal`] at its item boundaries, or sleeps on it with
//! [`CancelSignal::wait_timeout`] so that a stop request wakes it early.

use core::time::Duration;
use event_listener::{Event, Listener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Clonable one-way flag: once cancelled it stays cancelled.
///
/// All clones observe the same state. Cancelling wakes every thread blocked
/// in [`wait_timeout`](Self::wait_timeout) and every future awaiting
/// [`cancelled`](Self::cancelled).
///
/// # Example
///
/// ```
/// use strand_core::CancelSignal;
/// use std::time::Duration;
///
/// let signal = CancelSignal::new();
/// let worker_signal = signal.clone();
///
/// let worker = std::thread::spawn(move || {
///     let mut ticks = 0;
///     while !worker_signal.wait_timeout(Duration::from_millis(1)) {
///         ticks += 1;
///     }
///     ticks
/// });
///
/// signal.cancel();
/// worker.join().unwrap();
/// assert!(signal.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    event: Event,
}

impl CancelSignal {
    /// Create a signal in the not-cancelled state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                event: Event::new(),
            }),
        }
    }

    /// Request cancellation and wake all waiters. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.event.notify(usize::MAX);
    }

    /// Check the flag without blocking.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Block the current thread for at most `timeout`, returning early if the
    /// signal is cancelled.
    ///
    /// Returns `true` if the signal is cancelled when the call returns.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_cancelled() {
                return true;
            }

            let listener = self.inner.event.listen();

            // cancel() may have run between the check above and listen()
            if self.is_cancelled() {
                return true;
            }

            if listener.wait_deadline(deadline).is_none() {
                return self.is_cancelled();
            }
        }
    }

    /// Wait asynchronously until the signal is cancelled.
    ///
    /// Resolves immediately if it already is.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }

            let listener = self.inner.event.listen();

            if self.is_cancelled() {
                return;
            }

            listener.await;
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}
