// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::options::RunOptions;
use crate::runner::{RunKey, TaskRunner};
use crate::single_flight::FlightHandles;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use strand_core::{StrandError, TaskError, TaskHandle, TaskState};

type Outcome<T, E> = Arc<Mutex<Option<Result<T, TaskError<E>>>>>;

impl<K: RunKey> TaskRunner<K> {
    /// Run `work` once on the worker pool and deliver its outcome.
    ///
    /// Exactly one of `on_success` / `on_error` is dispatched, unless the
    /// outcome is stale: with a key and `drop_outdated`, a call whose key was
    /// taken by a newer call in the meantime delivers nothing at all.
    ///
    /// `cancel_previous` cancels the key's previous holder if it has not
    /// started yet. A holder that is already running finishes, and its result
    /// is then dropped as stale.
    ///
    /// A panic inside `work` is caught and delivered as
    /// [`TaskError::Panicked`]. If the task is cancelled before it starts and
    /// is still current, `on_error` receives [`TaskError::Cancelled`].
    /// Panics raised by the callbacks themselves are not caught.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::SubmissionRejected`] if the pool refused the
    /// job; no callback will run in that case. The key's generation has
    /// already advanced, so earlier calls under the key are still superseded.
    pub fn run<T, E, W, S, F>(
        &self,
        work: W,
        on_success: S,
        on_error: F,
        options: RunOptions<K>,
    ) -> Result<TaskHandle, StrandError>
    where
        T: Send + 'static,
        E: Send + 'static,
        W: FnOnce() -> Result<T, E> + Send + 'static,
        S: FnOnce(T) + Send + 'static,
        F: FnOnce(TaskError<E>) + Send + 'static,
    {
        let RunOptions {
            key,
            cancel_previous,
            drop_outdated,
        } = options;
        let token = self.inner.registry.begin(key.as_ref(), cancel_previous);

        let outcome: Outcome<T, E> = Arc::new(Mutex::new(None));
        let slot = outcome.clone();
        let task = TaskHandle::submit(&*self.inner.pool, move || {
            let result = match catch_unwind(AssertUnwindSafe(work)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(error)) => Err(TaskError::Failed(error)),
                Err(payload) => Err(TaskError::from_panic(payload)),
            };
            *slot.lock() = Some(result);
        })
        .inspect_err(|error| warn!("run for key {:?} not submitted: {}", key, error))?;

        let ticket = self.ticket(key, token, drop_outdated);
        ticket.record(FlightHandles::task(task.clone()));

        task.on_settled(move |state| {
            let result = match state {
                TaskState::Cancelled => Err(TaskError::Cancelled),
                _ => {
                    let taken = outcome.lock().take();
                    let Some(result) = taken else {
                        error!("task settled as {:?} without an outcome", state);
                        return;
                    };
                    result
                }
            };

            ticket.deliver("outcome", move || match result {
                Ok(value) => on_success(value),
                Err(error) => on_error(error),
            });
        });

        Ok(task)
    }
}
