// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Queue-backed [`DispatchSink`] pumped by a serialized context.
//!
//! [`dispatch_queue`] returns a sink that can be cloned into any number of
//! runners, and a [`DispatchQueue`] that the owning context drains. A UI loop
//! typically calls [`DispatchQueue::run_pending`] once per frame; a dedicated
//! thread can use [`DispatchQueue::run_next_blocking`]; an async context can
//! await [`DispatchQueue::run`].
//!
//! ```
//! use strand_core::{dispatch_queue, Dispatcher};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let (sink, queue) = dispatch_queue();
//! let dispatcher = Dispatcher::new(sink);
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..3 {
//!     let hits = hits.clone();
//!     dispatcher.dispatch(move || {
//!         hits.fetch_add(1, Ordering::SeqCst);
//!     });
//! }
//!
//! assert_eq!(hits.load(Ordering::SeqCst), 0);
//! assert_eq!(queue.run_pending(), 3);
//! assert_eq!(hits.load(Ordering::SeqCst), 3);
//! ```

use crate::dispatch::{Callback, DispatchSink};
use async_channel::{Receiver, Sender};

/// Create a connected sink/queue pair backed by an unbounded channel.
#[must_use]
pub fn dispatch_queue() -> (QueueSink, DispatchQueue) {
    let (tx, rx) = async_channel::unbounded();
    (QueueSink { tx }, DispatchQueue { rx })
}

/// Producer side: enqueues callbacks for the owning context.
#[derive(Clone, Debug)]
pub struct QueueSink {
    tx: Sender<Callback>,
}

impl QueueSink {
    /// `true` once the [`DispatchQueue`] has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl DispatchSink for QueueSink {
    fn dispatch(&self, callback: Callback) {
        if self.tx.try_send(callback).is_err() {
            warn!("dispatch queue is closed; dropping callback");
        }
    }
}

/// Consumer side: runs queued callbacks in FIFO order on the calling thread.
#[derive(Debug)]
pub struct DispatchQueue {
    rx: Receiver<Callback>,
}

impl DispatchQueue {
    /// Run callbacks until the queue is momentarily empty, without blocking.
    ///
    /// Callbacks enqueued by the callbacks themselves are run too. Returns how
    /// many callbacks ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(callback) = self.rx.try_recv() {
            callback();
            ran += 1;
        }
        ran
    }

    /// Block until a callback arrives and return it without running it.
    ///
    /// Returns `None` once every [`QueueSink`] has been dropped and the queue
    /// is drained.
    pub fn next_blocking(&self) -> Option<Callback> {
        self.rx.recv_blocking().ok()
    }

    /// Block until a callback arrives, then run it.
    ///
    /// Returns `false` once every [`QueueSink`] has been dropped and the queue
    /// is drained.
    pub fn run_next_blocking(&self) -> bool {
        match self.next_blocking() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Pump callbacks until every [`QueueSink`] has been dropped.
    pub async fn run(&self) {
        while let Ok(callback) = self.rx.recv().await {
            callback();
        }
    }

    /// Number of callbacks waiting to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
