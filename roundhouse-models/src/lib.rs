// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! Example stage computations to run through the
//! [scheduler](roundhouse_pipeline::scheduler::Scheduler).
//!
//! The scheduler treats its per-stage computation as an opaque pure
//! function; this crate supplies the ones used by the demos and tests:
//! a [dense layer](crate::layers::dense) over
//! [`Microbatch`](crate::microbatch::Microbatch) tensors, a scalar
//! [add](crate::layers::add_scalar) for checking schedules by hand, and an
//! [identity](crate::layers::identity). The
//! [unrolled reference](crate::reference::unrolled) applies the same
//! layers with no pipelining and is the ground truth the scheduler is
//! verified against.

pub mod generate;
pub mod layers;
pub mod microbatch;
pub mod reference;
