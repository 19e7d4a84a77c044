// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Stage functions.
//!
//! Every function here is a valid [`Stage`](roundhouse_pipeline::stage::Stage)
//! and is pure: no state, no side effects on its weights. All of them pass
//! the empty placeholder microbatch through untouched, since fill/drain
//! bubble slots carry it and its values are discarded by the scheduler.

use ndarray::Array2;
use roundhouse_engine::run_error;
use roundhouse_engine::types::RunError;

use crate::microbatch::Microbatch;

/// One dense layer: `tanh(x . W)` with square weights `[features, features]`.
pub fn dense(weights: &Array2<f32>, mut input: Microbatch) -> Result<Microbatch, RunError> {
    if input.data.is_empty() {
        return Ok(input);
    }
    if input.data.ncols() != weights.nrows() {
        run_error!(format!(
            "dense layer expects {} features, got {}",
            weights.nrows(),
            input.data.ncols()
        ));
    }
    input.data = input.data.dot(weights).mapv(f32::tanh);
    Ok(input)
}

/// Elementwise `x + w` with a scalar weight per layer.
///
/// With weights chosen as distinct powers of ten this makes schedule
/// mistakes directly readable off the output values.
pub fn add_scalar(weights: &f32, mut input: Microbatch) -> Result<Microbatch, RunError> {
    if input.data.is_empty() {
        return Ok(input);
    }
    let weight = *weights;
    input.data.mapv_inplace(|value| value + weight);
    Ok(input)
}

/// Pass values through unchanged, whatever the weights.
pub fn identity<W>(_weights: &W, input: Microbatch) -> Result<Microbatch, RunError> {
    Ok(input)
}
