// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Background task runner with "latest request wins" semantics.
//!
//! # Architecture
//!
//! - **[`TaskRunner::run`]**: one-shot work on a worker pool, one outcome
//!   callback on the dispatch context
//! - **[`TaskRunner::stream`]**: a producer loop on a worker pool, its items
//!   coalesced to the latest before they reach the dispatch context
//! - **[`SingleFlight`]**: per-key generations deciding which outcome is still
//!   current
//! - **[`subscribe_on`]**: moves event-bus handlers onto the runner
//!
//! # Keys
//!
//! Calls sharing a key in [`RunOptions`] compete: only the newest call's
//! callbacks run (with `drop_outdated`, the default), and `cancel_previous`
//! additionally stops the previous holder from starting. Unkeyed calls never
//! affect each other.

#[macro_use]
mod logging;

mod coalescer;
pub mod options;
mod run;
pub mod runner;
pub mod single_flight;
pub mod stream;
pub mod subscribe_on;

pub use self::options::RunOptions;
pub use self::runner::{RunKey, TaskRunner, TaskRunnerBuilder};
pub use self::single_flight::{FlightHandles, Generation, SingleFlight};
pub use self::stream::StreamHandle;
pub use self::subscribe_on::subscribe_on;
