// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the strand background task runner
//!
//! Two families of errors exist and they never mix:
//!
//! - [`StrandError`] describes failures of the framework itself, such as a
//!   worker pool refusing a submission. These are returned from `run`/`stream`.
//! - [`TaskError<E>`] describes the outcome of a single operation and is handed
//!   to the caller's `on_error` callback. `E` is the caller's own error type.
//!
//! # Examples
//!
//! ```
//! use strand_error::{StrandError, Result};
//!
//! fn submit() -> Result<()> {
//!     Err(StrandError::submission_rejected("pool is shutting down"))
//! }
//!
//! assert!(submit().is_err());
//! ```

use std::any::Any;

/// Root error type for all strand framework operations
#[derive(Debug, thiserror::Error)]
pub enum StrandError {
    /// The worker pool refused to accept a unit of work
    ///
    /// Typically the pool has been shut down or its thread limit was hit.
    #[error("Worker pool rejected submission: {context}")]
    SubmissionRejected {
        /// Why the pool refused the job
        context: String,
    },

    /// A pool bound to an async runtime was requested outside of that runtime
    #[error("Runtime unavailable: {context}")]
    RuntimeUnavailable {
        /// Which runtime was looked up and how
        context: String,
    },

    /// Invalid state encountered
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state
        message: String,
    },

    /// Custom error from user code
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StrandError {
    /// Create a submission rejected error with the given context
    pub fn submission_rejected(context: impl Into<String>) -> Self {
        Self::SubmissionRejected {
            context: context.into(),
        }
    }

    /// Create a runtime unavailable error with the given context
    pub fn runtime_unavailable(context: impl Into<String>) -> Self {
        Self::RuntimeUnavailable {
            context: context.into(),
        }
    }

    /// Create an invalid state error with the given message
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Check if this is a recoverable error
    ///
    /// A rejected submission may succeed once the pool has capacity again.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::SubmissionRejected { .. })
    }
}

/// Specialized Result type for strand operations
///
/// ```
/// use strand_error::Result;
///
/// fn process() -> Result<u32> {
///     Ok(7)
/// }
/// ```
pub type Result<T> = std::result::Result<T, StrandError>;

/// Failure of a single background operation, as seen by `on_error`
///
/// Stale outcomes are not errors: a result belonging to a superseded
/// generation is dropped and never turns into a `TaskError`. A stream that is
/// stopped cooperatively also never produces one.
#[derive(Debug, thiserror::Error)]
pub enum TaskError<E> {
    /// The operation returned an error of the caller's type
    #[error("Task failed: {0}")]
    Failed(E),

    /// The operation panicked on the worker thread
    #[error("Task panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text
        message: String,
    },

    /// The operation was cancelled before a worker picked it up
    #[error("Task cancelled before it started")]
    Cancelled,
}

impl<E> TaskError<E> {
    /// Convert a panic payload caught with `catch_unwind`
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked { message }
    }

    /// Borrow the caller's error, if this is a [`TaskError::Failed`]
    pub const fn failure(&self) -> Option<&E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Take the caller's error, if this is a [`TaskError::Failed`]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }

    /// Map the caller's error type, keeping panics and cancellations as-is
    pub fn map<F, U>(self, f: F) -> TaskError<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            Self::Failed(error) => TaskError::Failed(f(error)),
            Self::Panicked { message } => TaskError::Panicked { message },
            Self::Cancelled => TaskError::Cancelled,
        }
    }
}
