// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Seam between the task runner and whatever executes its work.
//!
//! The runner never owns worker threads. It is handed a [`WorkerPool`] and
//! only ever submits to it; the pool's lifecycle belongs to the caller.
//! Concrete pools live in `strand-runtime`.

use std::sync::Arc;
use strand_error::Result;

/// A zero-argument unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Executes jobs off the calling thread (or, for test pools, wherever it likes).
pub trait WorkerPool: Send + Sync {
    /// Accept `job` for execution.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::SubmissionRejected`](strand_error::StrandError::SubmissionRejected)
    /// when the pool cannot take more work. The job is dropped unexecuted.
    fn execute(&self, job: Job) -> Result<()>;
}

impl<P> WorkerPool for Arc<P>
where
    P: WorkerPool + ?Sized,
{
    fn execute(&self, job: Job) -> Result<()> {
        (**self).execute(job)
    }
}
