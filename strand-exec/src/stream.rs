// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::coalescer::Coalescer;
use crate::options::RunOptions;
use crate::runner::{RunKey, TaskRunner, Ticket};
use crate::single_flight::FlightHandles;
use core::time::Duration;
use std::panic::{catch_unwind, AssertUnwindSafe};
use strand_core::{CancelSignal, StrandError, TaskError, TaskHandle, TaskState};

/// Caller-side handle of a running stream.
///
/// Dropping it does not stop the stream.
#[derive(Clone, Debug)]
pub struct StreamHandle {
    signal: CancelSignal,
    task: TaskHandle,
}

impl StreamHandle {
    /// Ask the producer loop to stop at its next item boundary.
    ///
    /// The stream then completes normally: `on_complete` fires, `on_error`
    /// does not.
    pub fn stop(&self) {
        self.signal.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.is_cancelled()
    }

    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    pub fn task(&self) -> &TaskHandle {
        &self.task
    }

    /// Block until the producer loop has exited and `on_complete` was handed
    /// to the dispatcher.
    pub fn wait(&self) -> TaskState {
        self.task.wait()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<TaskState> {
        self.task.wait_timeout(timeout)
    }

    pub async fn finished(&self) -> TaskState {
        self.task.settled().await
    }
}

enum Exit<E> {
    Exhausted,
    Stopped,
    Superseded,
    Failed(TaskError<E>),
}

impl<K: RunKey> TaskRunner<K> {
    /// Run `producer` on the worker pool and deliver its items.
    ///
    /// # Delivery policy: coalesce to latest
    ///
    /// Items are never queued. The producer loop stores each item in a
    /// single pending slot and schedules at most one flush on the dispatcher
    /// at a time; that flush delivers whatever item is newest when it runs.
    /// A producer faster than the dispatch context therefore sees its
    /// intermediate items dropped, while the consumer always ends on the most
    /// recent one. With no dispatch sink, flushes run inline and every item is
    /// delivered.
    ///
    /// # Termination
    ///
    /// Before each item the loop checks the stream's [`CancelSignal`] and,
    /// for keyed calls with `drop_outdated`, whether a newer call took the
    /// key. Either ends the loop quietly. The producer receives the same
    /// signal and should poll it wherever it blocks.
    ///
    /// A producer that yields `Err(e)` or panics ends the stream and
    /// dispatches `on_error` once, unless the stream is stale. `on_complete`
    /// is dispatched exactly once in every case, after any `on_error`, even
    /// if the stream was stopped, superseded or cancelled before it started.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::SubmissionRejected`] if the pool refused the
    /// job; no callback will run in that case.
    pub fn stream<T, E, P, I, N, F, C>(
        &self,
        producer: P,
        on_item: N,
        on_error: F,
        on_complete: C,
        options: RunOptions<K>,
    ) -> Result<StreamHandle, StrandError>
    where
        T: Send + 'static,
        E: Send + 'static,
        P: FnOnce(CancelSignal) -> I + Send + 'static,
        I: IntoIterator<Item = Result<T, E>>,
        N: Fn(T) + Send + Sync + 'static,
        F: FnOnce(TaskError<E>) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let RunOptions {
            key,
            cancel_previous,
            drop_outdated,
        } = options;
        let signal = CancelSignal::new();
        let token = self.inner.registry.begin(key.as_ref(), cancel_previous);
        let ticket = self.ticket(key, token, drop_outdated);

        let body = {
            let ticket = ticket.clone();
            let signal = signal.clone();
            move || {
                let freshness = ticket.clone();
                let coalescer =
                    Coalescer::new(ticket.dispatcher().clone(), on_item, move || {
                        freshness.is_current()
                    });

                let exit = drain(producer, &signal, &ticket, |item| coalescer.publish(item));
                let reason = match exit {
                    Exit::Failed(error) => {
                        ticket.clone().deliver("stream error", move || on_error(error));
                        "failed"
                    }
                    Exit::Exhausted => "exhausted",
                    Exit::Stopped => "stopped",
                    Exit::Superseded => "superseded",
                };
                debug!("stream for key {:?} {}", ticket.key(), reason);
            }
        };

        let task = TaskHandle::submit(&*self.inner.pool, body).inspect_err(|error| {
            warn!("stream not submitted: {}", error);
        })?;

        ticket.record(FlightHandles::stream(task.clone(), signal.clone()));

        let dispatcher = ticket.dispatcher().clone();
        task.on_settled(move |_| dispatcher.dispatch(on_complete));

        Ok(StreamHandle { signal, task })
    }
}

fn drain<K, T, E, P, I>(
    producer: P,
    signal: &CancelSignal,
    ticket: &Ticket<K>,
    mut publish: impl FnMut(T),
) -> Exit<E>
where
    K: RunKey,
    P: FnOnce(CancelSignal) -> I,
    I: IntoIterator<Item = Result<T, E>>,
{
    if signal.is_cancelled() {
        return Exit::Stopped;
    }

    let started = catch_unwind(AssertUnwindSafe(|| producer(signal.clone()).into_iter()));
    let mut items = match started {
        Ok(items) => items,
        Err(payload) => return Exit::Failed(TaskError::from_panic(payload)),
    };

    loop {
        let next = match catch_unwind(AssertUnwindSafe(|| items.next())) {
            Ok(next) => next,
            Err(payload) => return Exit::Failed(TaskError::from_panic(payload)),
        };
        let item = match next {
            None => return Exit::Exhausted,
            Some(Err(error)) => return Exit::Failed(TaskError::Failed(error)),
            Some(Ok(item)) => item,
        };

        if signal.is_cancelled() {
            return Exit::Stopped;
        }
        if !ticket.is_current() {
            return Exit::Superseded;
        }
        publish(item);
    }
}
