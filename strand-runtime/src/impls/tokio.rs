// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[cfg(feature = "runtime-tokio")]
use strand_core::{Job, Result, StrandError, WorkerPool};

#[cfg(feature = "runtime-tokio")]
use tokio::runtime::Handle;

/// Runs jobs on tokio's blocking thread pool via `spawn_blocking`.
///
/// The pool borrows the runtime through its [`Handle`]; it does not keep the
/// runtime alive or shut it down.
#[cfg(feature = "runtime-tokio")]
#[derive(Clone, Debug)]
pub struct TokioPool {
    handle: Handle,
}

#[cfg(feature = "runtime-tokio")]
impl TokioPool {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the calling thread is running in.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::RuntimeUnavailable`] outside a tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|err| StrandError::runtime_unavailable(format!("tokio: {err}")))
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

#[cfg(feature = "runtime-tokio")]
impl WorkerPool for TokioPool {
    fn execute(&self, job: Job) -> Result<()> {
        // completion is tracked by the TaskHandle wrapped around the job
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}
