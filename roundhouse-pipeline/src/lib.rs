// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! Circular pipeline-parallel execution scheduling.
//!
//! A fixed number of physical [stages](crate::stage::Stage) is driven
//! through a much larger logical sequence of layers and microbatches: `S`
//! stages process `M` microbatches (`M % S == 0`) and are reused `R` times
//! ("repeats"), so that `S * R` logical layers are applied to every
//! microbatch using only `S` execution units.
//!
//! The [scheduler](crate::scheduler::Scheduler) owns four rotating
//! [buffers](crate::buffers::BufferSet) and advances them once per
//! iteration for exactly `M*R + S - 1` iterations; the `S - 1` term is the
//! unavoidable pipeline fill/drain bubble. Within one iteration the `S`
//! stage computations are independent and are fanned out as tasks on the
//! [engine](roundhouse_engine::engine::Engine), joined on a
//! [barrier](roundhouse_engine::events::barrier::Barrier) before the
//! buffers advance.
//!
//! # Example
//!
//! ```rust
//! use roundhouse_engine::types::RunError;
//! use roundhouse_pipeline::config::PipelineConfig;
//! use roundhouse_pipeline::scheduler::run_pipeline;
//! use roundhouse_pipeline::weights::WeightStore;
//!
//! // One stage reused twice: every microbatch gains both weights.
//! let config = PipelineConfig::new(1, 3, 2).unwrap();
//! let weights = WeightStore::from_layers(vec![10.0_f32, 20.0]);
//! let add = |w: &f32, x: f32| -> Result<f32, RunError> { Ok(x + w) };
//! let output = run_pipeline(&config, weights, add, vec![1.0, 2.0, 3.0]).unwrap();
//! assert_eq!(output, vec![31.0, 32.0, 33.0]);
//! ```

pub mod buffers;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod stage;
mod step;
pub mod weights;
