// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::single_flight::{FlightHandles, Generation, SingleFlight};
use core::fmt::{self, Debug};
use core::hash::Hash;
use std::sync::Arc;
use strand_core::{DispatchSink, Dispatcher, WorkerPool};

/// Bounds every runner key satisfies.
pub trait RunKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<K> RunKey for K where K: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

pub(crate) struct Shared<K> {
    pub(crate) pool: Arc<dyn WorkerPool>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) registry: SingleFlight<K>,
}

/// Runs blocking work on a [`WorkerPool`] and delivers results through a
/// [`DispatchSink`], with "latest request wins" semantics per key.
///
/// Cloning is cheap; clones share the pool, the sink and the key registry.
///
/// # Example
///
/// ```
/// use strand_exec::{RunOptions, TaskRunner};
/// use strand_runtime::InlinePool;
/// use std::sync::{Arc, Mutex};
///
/// let runner: TaskRunner = TaskRunner::new(InlinePool);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// runner
///     .run(
///         || Ok::<_, std::io::Error>(21 * 2),
///         move |value| sink.lock().unwrap().push(value),
///         |error| panic!("unexpected: {error}"),
///         RunOptions::keyed("answer"),
///     )
///     .unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec![42]);
/// ```
pub struct TaskRunner<K = String> {
    pub(crate) inner: Arc<Shared<K>>,
}

impl<K: RunKey> TaskRunner<K> {
    /// Runner without a dispatch sink: callbacks run on the worker thread
    /// that finished the work.
    pub fn new<P>(pool: P) -> Self
    where
        P: WorkerPool + 'static,
    {
        Self::builder(pool).build()
    }

    pub fn builder<P>(pool: P) -> TaskRunnerBuilder<K>
    where
        P: WorkerPool + 'static,
    {
        TaskRunnerBuilder {
            pool: Arc::new(pool),
            dispatcher: Dispatcher::immediate(),
            _key: core::marker::PhantomData,
        }
    }

    /// Cancel whatever currently holds `key`.
    ///
    /// A pending one-shot task is prevented from starting; a stream is asked
    /// to stop at its next item boundary. Returns `true` only if a pending
    /// job was prevented from starting.
    pub fn cancel(&self, key: &K) -> bool {
        self.inner.registry.cancel(key)
    }

    /// Cancel the holders of every key.
    pub fn cancel_all(&self) {
        self.inner.registry.cancel_all();
    }

    /// Newest generation issued for `key`, `0` if the key was never used.
    pub fn generation(&self, key: &K) -> Generation {
        self.inner.registry.generation(key)
    }

    pub fn registry(&self) -> &SingleFlight<K> {
        &self.inner.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub(crate) fn ticket(
        &self,
        key: Option<K>,
        token: Generation,
        drop_outdated: bool,
    ) -> Ticket<K> {
        Ticket {
            shared: self.inner.clone(),
            key,
            token,
            drop_outdated,
        }
    }
}

impl<K> Clone for TaskRunner<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Debug> Debug for TaskRunner<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRunner")
            .field("dispatcher", &self.inner.dispatcher)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

/// Builder returned by [`TaskRunner::builder`].
pub struct TaskRunnerBuilder<K> {
    pool: Arc<dyn WorkerPool>,
    dispatcher: Dispatcher,
    _key: core::marker::PhantomData<fn() -> K>,
}

impl<K: RunKey> TaskRunnerBuilder<K> {
    /// Deliver every callback through `sink`.
    #[must_use]
    pub fn sink<S>(mut self, sink: S) -> Self
    where
        S: DispatchSink + 'static,
    {
        self.dispatcher = Dispatcher::new(sink);
        self
    }

    #[must_use]
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn build(self) -> TaskRunner<K> {
        TaskRunner {
            inner: Arc::new(Shared {
                pool: self.pool,
                dispatcher: self.dispatcher,
                registry: SingleFlight::new(),
            }),
        }
    }
}

/// The identity of one submission: enough to ask whether it is still current.
pub(crate) struct Ticket<K> {
    shared: Arc<Shared<K>>,
    key: Option<K>,
    token: Generation,
    drop_outdated: bool,
}

impl<K: RunKey> Ticket<K> {
    pub(crate) fn is_current(&self) -> bool {
        self.shared
            .registry
            .is_current(self.key.as_ref(), self.token, self.drop_outdated)
    }

    pub(crate) fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.shared.dispatcher
    }

    /// Record the submitted job as the key's holder.
    pub(crate) fn record(&self, handles: FlightHandles) {
        let Some(key) = self.key.as_ref() else {
            return;
        };
        if !self.shared.registry.commit(Some(key), self.token, handles) {
            trace!(
                "handles for key {:?} (generation {}) not recorded: superseded or cancelled",
                key, self.token
            );
        }
    }

    /// Dispatch `callback` if this submission is current now and still is
    /// when the dispatch context gets to it.
    pub(crate) fn deliver<F>(self, what: &'static str, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.is_current() {
            self.log_stale(what);
            return;
        }
        let dispatcher = self.shared.dispatcher.clone();
        dispatcher.dispatch(move || {
            if self.is_current() {
                callback();
            } else {
                self.log_stale(what);
            }
        });
    }

    fn log_stale(&self, what: &str) {
        debug!(
            "dropping stale {} for key {:?} (generation {})",
            what, self.key, self.token
        );
    }
}

impl<K> Clone for Ticket<K>
where
    K: Clone,
{
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            key: self.key.clone(),
            token: self.token,
            drop_outdated: self.drop_outdated,
        }
    }
}
