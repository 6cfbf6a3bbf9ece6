// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A worker pool that only runs jobs when the test says so.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use strand_core::{Job, Result, StrandError, WorkerPool};

/// FIFO pool driven by the test thread.
///
/// Jobs queue up on [`execute`](WorkerPool::execute) and run on the calling
/// thread of [`run_next`](Self::run_next) / [`run_all`](Self::run_all). This
/// makes interleavings such as "cancel before start" fully deterministic.
///
/// Clones share the same queue, so one clone can be handed to a runner while
/// the test keeps the other.
#[derive(Clone, Default)]
pub struct ManualPool {
    state: Arc<Mutex<PoolState>>,
}

#[derive(Default)]
struct PoolState {
    jobs: VecDeque<Job>,
    rejecting: bool,
    submitted: usize,
}

impl ManualPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later submission fail with `SubmissionRejected`.
    pub fn reject_submissions(&self, rejecting: bool) {
        self.state.lock().rejecting = rejecting;
    }

    /// Run the oldest queued job. Returns `false` if none was queued.
    pub fn run_next(&self) -> bool {
        let Some(job) = self.state.lock().jobs.pop_front() else {
            return false;
        };
        job();
        true
    }

    /// Run queued jobs, including ones queued meanwhile, until none is left.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.state.lock().jobs.len()
    }

    /// Jobs accepted since creation.
    pub fn submitted(&self) -> usize {
        self.state.lock().submitted
    }
}

impl WorkerPool for ManualPool {
    fn execute(&self, job: Job) -> Result<()> {
        let mut state = self.state.lock();
        if state.rejecting {
            return Err(StrandError::submission_rejected("manual pool is rejecting"));
        }
        state.submitted += 1;
        state.jobs.push_back(job);
        Ok(())
    }
}
