// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Building blocks shared by the strand task runner and its pools.
//!
//! - [`CancelSignal`] - cooperative stop flag polled by producers
//! - [`TaskHandle`] - completion handle with pre-start cancellation
//! - [`WorkerPool`] - where work runs
//! - [`DispatchSink`] / [`Dispatcher`] - where results are delivered
//! - [`dispatch_queue`] - a sink drained by a serialized context
//! - [`LatestValue`] - non-consuming latest-item cell
//! - [`EventBus`] - synchronous topic pub/sub

#[macro_use]
mod logging;

pub mod cancel_signal;
pub mod dispatch;
pub mod dispatch_queue;
pub mod event_bus;
pub mod latest_value;
pub mod task_handle;
pub mod worker_pool;

pub use self::cancel_signal::CancelSignal;
pub use self::dispatch::{Callback, DispatchSink, Dispatcher};
pub use self::dispatch_queue::{dispatch_queue, DispatchQueue, QueueSink};
pub use self::event_bus::{EventBus, Subscription};
pub use self::latest_value::LatestValue;
pub use self::task_handle::{TaskHandle, TaskState};
pub use self::worker_pool::{Job, WorkerPool};
pub use strand_error::{Result, StrandError, TaskError};
