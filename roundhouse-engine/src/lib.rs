// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! `Roundhouse Engine` - the cooperative executor at the heart of the
//! Roundhouse pipeline scheduler.
//!
//! This library provides the [engine](crate::engine) which executes the
//! asynchronous tasks of a pipeline run: per-stage compute tasks are
//! fanned out onto the [executor](crate::executor) each iteration and
//! joined on a [barrier](crate::events::barrier) before the pipeline
//! buffers advance.
//!
//! # Simple Application
//!
//! A very simple application would look like:
//!
//! ```rust
//! use roundhouse_engine::engine::Engine;
//! use roundhouse_engine::events::barrier::Barrier;
//! use roundhouse_engine::traits::Event;
//!
//! let mut engine = Engine::default();
//! let barrier = Barrier::new(4);
//! for _ in 0..4 {
//!     let barrier = barrier.clone();
//!     engine.spawn(async move { barrier.arrive() });
//! }
//! let joined = barrier.clone();
//! engine.spawn(async move {
//!     joined.listen().await;
//!     Ok(())
//! });
//! engine.run().unwrap();
//! assert!(barrier.is_released());
//! ```
//!
//! The scheduling model is deliberately small: there is no simulated time
//! and no preemption. Tasks only interleave at `await` points, and a run
//! ends when no task can make further progress.

pub mod engine;
pub mod events;
pub mod executor;
pub mod test_helpers;
pub mod traits;
pub mod types;
