// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use strand_core::{Job, Result, WorkerPool};

/// Executes every job synchronously inside [`WorkerPool::execute`].
///
/// Nothing runs in the background: `run` and `stream` only return after the
/// work has completed. This makes outcomes fully deterministic, which is what
/// unit tests and headless tools want, but it must not be used from a UI
/// thread.
///
/// ```
/// use strand_core::{TaskHandle, TaskState};
/// use strand_runtime::InlinePool;
///
/// let handle = TaskHandle::submit(&InlinePool, || {}).unwrap();
/// assert_eq!(handle.state(), TaskState::Finished);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct InlinePool;

impl WorkerPool for InlinePool {
    fn execute(&self, job: Job) -> Result<()> {
        job();
        Ok(())
    }
}
