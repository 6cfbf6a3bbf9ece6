// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Completion handle for a unit of work submitted to a worker pool.
//!
//! The handle wraps the job before it reaches the pool, so every pool gets the
//! same two capabilities for free:
//!
//! - cancellation that is effective only while the job is still queued, and
//! - completion hooks that run exactly once when the job settles.

use crate::worker_pool::WorkerPool;
use core::fmt;
use core::time::Duration;
use event_listener::{Event, Listener};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;
use strand_error::Result;

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const FINISHED: u8 = 2;
const CANCELLED: u8 = 3;

/// Lifecycle of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Queued, not yet picked up by a worker.
    Pending,
    /// A worker is executing the job body.
    Running,
    /// The job body returned (or unwound).
    Finished,
    /// The job was cancelled before a worker picked it up.
    Cancelled,
}

impl TaskState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            PENDING => Self::Pending,
            RUNNING => Self::Running,
            FINISHED => Self::Finished,
            _ => Self::Cancelled,
        }
    }

    /// `true` for [`Finished`](Self::Finished) and [`Cancelled`](Self::Cancelled).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

type Hook = Box<dyn FnOnce(TaskState) + Send + 'static>;

enum Hooks {
    Open(Vec<Hook>),
    Sealed,
}

struct Inner {
    phase: AtomicU8,
    settled: AtomicBool,
    hooks: Mutex<Hooks>,
    event: Event,
}

/// Shared handle to one submitted job.
///
/// Cloning is cheap; all clones refer to the same job. Dropping every handle
/// does not cancel the job.
///
/// A job is *settled* once it reached a terminal state **and** all of its
/// completion hooks have returned. Waiters are released only then.
#[derive(Clone)]
pub struct TaskHandle {
    inner: Arc<Inner>,
}

impl TaskHandle {
    /// Create a handle in the [`TaskState::Pending`] state, not yet bound to
    /// any pool.
    ///
    /// Most callers want [`TaskHandle::submit`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                phase: AtomicU8::new(PENDING),
                settled: AtomicBool::new(false),
                hooks: Mutex::new(Hooks::Open(Vec::new())),
                event: Event::new(),
            }),
        }
    }

    /// Wrap `body` and hand it to `pool`.
    ///
    /// The body only runs if the handle has not been cancelled by the time a
    /// worker picks it up. The handle finishes even if the body panics.
    ///
    /// # Errors
    ///
    /// Propagates the pool's refusal to accept the job.
    ///
    /// # Example
    ///
    /// ```
    /// use strand_core::{Job, TaskHandle, TaskState, WorkerPool};
    ///
    /// struct Inline;
    ///
    /// impl WorkerPool for Inline {
    ///     fn execute(&self, job: Job) -> strand_error::Result<()> {
    ///         job();
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let handle = TaskHandle::submit(&Inline, || {}).unwrap();
    /// assert_eq!(handle.wait(), TaskState::Finished);
    /// ```
    pub fn submit<P, F>(pool: &P, body: F) -> Result<Self>
    where
        P: WorkerPool + ?Sized,
        F: FnOnce() + Send + 'static,
    {
        let handle = Self::new();
        let job_handle = handle.clone();
        pool.execute(Box::new(move || {
            if !job_handle.start() {
                return;
            }
            let _finish = FinishOnDrop(&job_handle);
            body();
        }))?;
        Ok(handle)
    }

    /// Attempt to cancel the job.
    ///
    /// Succeeds only while the job is still [`TaskState::Pending`]. A running
    /// job is never interrupted; `false` is returned instead. On success the
    /// completion hooks run on the calling thread.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .inner
            .phase
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.settle(TaskState::Cancelled);
        }
        cancelled
    }

    /// Transition `Pending -> Running`. Returns `false` if the job was
    /// cancelled first.
    pub fn start(&self) -> bool {
        self.inner
            .phase
            .compare_exchange(PENDING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Transition `Running -> Finished` and run the completion hooks.
    pub fn finish(&self) {
        let finished = self
            .inner
            .phase
            .compare_exchange(RUNNING, FINISHED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if finished {
            self.settle(TaskState::Finished);
        } else {
            error!(
                "task handle finished from state {:?}; ignoring",
                self.state()
            );
        }
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_raw(self.inner.phase.load(Ordering::Acquire))
    }

    /// `true` once the job is terminal and its completion hooks have run.
    pub fn is_settled(&self) -> bool {
        self.inner.settled.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }

    /// Register a completion hook.
    ///
    /// The hook runs once, with the terminal state, on the thread that settles
    /// the job. If the job already reached a terminal state the hook runs
    /// immediately on the calling thread.
    pub fn on_settled<F>(&self, hook: F)
    where
        F: FnOnce(TaskState) + Send + 'static,
    {
        {
            let mut hooks = self.inner.hooks.lock();
            if let Hooks::Open(pending) = &mut *hooks {
                pending.push(Box::new(hook));
                return;
            }
        }
        hook(self.state());
    }

    /// Block until the job settles.
    pub fn wait(&self) -> TaskState {
        loop {
            if self.is_settled() {
                return self.state();
            }

            let listener = self.inner.event.listen();

            if self.is_settled() {
                return self.state();
            }

            listener.wait();
        }
    }

    /// Block until the job settles or `timeout` elapses.
    ///
    /// Returns `None` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<TaskState> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_settled() {
                return Some(self.state());
            }

            let listener = self.inner.event.listen();

            if self.is_settled() {
                return Some(self.state());
            }

            if listener.wait_deadline(deadline).is_none() {
                return self.is_settled().then(|| self.state());
            }
        }
    }

    /// Wait asynchronously until the job settles.
    pub async fn settled(&self) -> TaskState {
        loop {
            if self.is_settled() {
                return self.state();
            }

            let listener = self.inner.event.listen();

            if self.is_settled() {
                return self.state();
            }

            listener.await;
        }
    }

    fn settle(&self, state: TaskState) {
        let hooks = match core::mem::replace(&mut *self.inner.hooks.lock(), Hooks::Sealed) {
            Hooks::Open(hooks) => hooks,
            Hooks::Sealed => Vec::new(),
        };

        let _release = ReleaseOnDrop(&self.inner);
        for hook in hooks {
            hook(state);
        }
    }
}

impl Default for TaskHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("state", &self.state())
            .field("settled", &self.is_settled())
            .finish()
    }
}

struct FinishOnDrop<'a>(&'a TaskHandle);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

// Waiters must be released even if a completion hook panics.
struct ReleaseOnDrop<'a>(&'a Inner);

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.settled.store(true, Ordering::Release);
        self.0.event.notify(usize::MAX);
    }
}
