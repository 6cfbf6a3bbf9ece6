// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Concrete [`WorkerPool`](strand_core::WorkerPool) implementations.
//!
//! - [`TokioPool`] (`runtime-tokio`, default) - tokio's blocking thread pool
//! - [`SmolPool`] (`runtime-smol`) - smol's blocking thread pool
//! - [`InlinePool`] - runs each job on the submitting thread

pub mod impls;

pub use impls::inline::InlinePool;
#[cfg(feature = "runtime-smol")]
pub use impls::smol::SmolPool;
#[cfg(feature = "runtime-tokio")]
pub use impls::tokio::TokioPool;
