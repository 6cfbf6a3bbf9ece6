// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test doubles and helpers for the strand workspace.
//!
//! Development and testing only, not for production code.
//!
//! - [`ManualPool`] - a worker pool whose jobs run only when the test steps it
//! - [`paced_sink`] - a dispatch sink with a fixed delay per callback
//! - [`Recorder`] - collects callback arguments across threads
//! - [`Gate`] - holds a worker back until the test opens it
//! - [`TestError`] - the error type test work fails with
//! - [`wait_until`] / [`wait_until_async`] - bounded polling

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod gate;
pub mod helpers;
pub mod manual_pool;
pub mod paced_sink;
pub mod recorder;
pub mod test_error;

pub use gate::Gate;
pub use helpers::{wait_until, wait_until_async};
pub use manual_pool::ManualPool;
pub use paced_sink::paced_sink;
pub use recorder::Recorder;
pub use test_error::TestError;
