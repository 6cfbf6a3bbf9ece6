// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Strand
//!
//! Run blocking work off the event loop and bring the results back to it,
//! with "latest request wins" semantics.
//!
//! ## Overview
//!
//! A [`TaskRunner`] owns a [`WorkerPool`] where work runs and an optional
//! [`DispatchSink`] where callbacks run (typically a UI loop, see
//! [`dispatch_queue`]). Every submission may carry a key; submissions sharing
//! a key compete, and only the newest one's callbacks are delivered.
//!
//! - [`TaskRunner::run`] - one-shot work, one outcome callback
//! - [`TaskRunner::stream`] - a producer loop whose items are coalesced to the
//!   latest before delivery, so a slow consumer is never flooded
//! - [`subscribe_on`] - moves [`EventBus`] handlers onto the runner
//!
//! ## Quick Start
//!
//! ```rust
//! use strand::prelude::*;
//!
//! let (sink, queue) = dispatch_queue();
//! let runner: TaskRunner = TaskRunner::builder(InlinePool).sink(sink).build();
//!
//! runner
//!     .run(
//!         || Ok::<_, std::io::Error>("first"),
//!         |value| println!("{value}"),
//!         |error| eprintln!("{error}"),
//!         RunOptions::keyed("panel"),
//!     )
//!     .unwrap();
//! runner
//!     .run(
//!         || Ok::<_, std::io::Error>("second"),
//!         |value| assert_eq!(value, "second"),
//!         |error| eprintln!("{error}"),
//!         RunOptions::keyed("panel"),
//!     )
//!     .unwrap();
//!
//! // the UI loop drains the queue; "first" is stale and never printed
//! queue.run_pending();
//! ```
//!
//! ## Cargo features
//!
//! - `runtime-tokio` (default) - [`TokioPool`] on tokio's blocking pool
//! - `runtime-smol` - `SmolPool` on smol's blocking pool
//! - `tracing` (default) - log through `tracing` instead of stderr

pub use strand_core::{
    dispatch_queue, CancelSignal, DispatchQueue, DispatchSink, Dispatcher, EventBus, Job,
    LatestValue, QueueSink, Subscription, TaskHandle, TaskState, WorkerPool,
};
pub use strand_error::{Result, StrandError, TaskError};
pub use strand_exec::{
    subscribe_on, FlightHandles, Generation, RunKey, RunOptions, SingleFlight, StreamHandle,
    TaskRunner, TaskRunnerBuilder,
};
pub use strand_runtime::InlinePool;
#[cfg(feature = "runtime-smol")]
pub use strand_runtime::SmolPool;
#[cfg(feature = "runtime-tokio")]
pub use strand_runtime::TokioPool;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        dispatch_queue, subscribe_on, CancelSignal, EventBus, InlinePool, RunOptions,
        StreamHandle, TaskError, TaskRunner,
    };
    #[cfg(feature = "runtime-tokio")]
    pub use crate::TokioPool;
}
