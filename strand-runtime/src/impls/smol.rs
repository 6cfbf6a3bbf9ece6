// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[cfg(feature = "runtime-smol")]
use strand_core::{Job, Result, WorkerPool};

/// Runs jobs on smol's global blocking thread pool.
#[cfg(feature = "runtime-smol")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SmolPool;

#[cfg(feature = "runtime-smol")]
impl WorkerPool for SmolPool {
    fn execute(&self, job: Job) -> Result<()> {
        smol::unblock(job).detach();
        Ok(())
    }
}
