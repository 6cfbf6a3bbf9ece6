// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The point where results cross back from worker threads to the caller.
//!
//! A [`DispatchSink`] marshals a zero-argument callback onto a designated,
//! serialized execution context such as a UI event loop. Callbacks routed
//! through one sink are never run concurrently with each other.
//!
//! When no sink is configured a [`Dispatcher`] runs callbacks synchronously
//! on the calling thread, which for the task runner is a worker thread.
//! Callers that mutate thread-affine state (widgets, for instance) must
//! configure a sink.

use core::fmt;
use std::sync::Arc;

/// A zero-argument callback to run on the dispatch context.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Schedules callbacks on a serialized execution context.
///
/// Implementations must eventually run every callback they accept, one at a
/// time. Panics raised by a callback belong to the context running it.
///
/// Any `Fn(Callback)` closure is a sink:
///
/// ```
/// use strand_core::{Callback, Dispatcher};
/// use std::sync::mpsc;
///
/// let (tx, rx) = mpsc::channel::<Callback>();
/// let tx = std::sync::Mutex::new(tx);
/// let dispatcher = Dispatcher::new(move |cb: Callback| {
///     tx.lock().unwrap().send(cb).unwrap();
/// });
///
/// dispatcher.dispatch(|| println!("on the ui thread"));
/// (rx.recv().unwrap())();
/// ```
pub trait DispatchSink: Send + Sync {
    fn dispatch(&self, callback: Callback);
}

impl<F> DispatchSink for F
where
    F: Fn(Callback) + Send + Sync,
{
    fn dispatch(&self, callback: Callback) {
        self(callback);
    }
}

/// Optional [`DispatchSink`] with a synchronous fallback.
#[derive(Clone, Default)]
pub struct Dispatcher {
    sink: Option<Arc<dyn DispatchSink>>,
}

impl Dispatcher {
    /// Route callbacks through `sink`.
    pub fn new<S>(sink: S) -> Self
    where
        S: DispatchSink + 'static,
    {
        Self {
            sink: Some(Arc::new(sink)),
        }
    }

    /// Share an existing sink.
    pub fn from_arc(sink: Arc<dyn DispatchSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Run callbacks directly on the calling thread.
    #[must_use]
    pub fn immediate() -> Self {
        Self { sink: None }
    }

    #[must_use]
    pub fn is_immediate(&self) -> bool {
        self.sink.is_none()
    }

    /// Hand `callback` to the sink, or run it now if there is none.
    pub fn dispatch<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.sink {
            Some(sink) => sink.dispatch(Box::new(callback)),
            None => callback(),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("immediate", &self.is_immediate())
            .finish()
    }
}
