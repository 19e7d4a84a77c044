// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The tensor payload flowing through a pipeline.

use ndarray::{Array2, Axis, concatenate, s};
use roundhouse_engine::run_error;
use roundhouse_engine::types::RunError;

/// One microbatch of activations, `[rows, features]`.
///
/// The default value is the empty placeholder that fills the pipeline
/// buffers before any real activations have reached them; stage functions
/// pass it through untouched (see [`crate::layers`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Microbatch {
    /// Position of this microbatch within the global batch.
    pub index: usize,

    /// The activations.
    pub data: Array2<f32>,
}

impl Microbatch {
    /// Wrap activations as microbatch `index`.
    #[must_use]
    pub fn new(index: usize, data: Array2<f32>) -> Self {
        Self { index, data }
    }
}

impl Default for Microbatch {
    fn default() -> Self {
        Self {
            index: 0,
            data: Array2::zeros((0, 0)),
        }
    }
}

/// Split a `[batch_rows, features]` global batch into `count` equal
/// microbatches, in row order.
pub fn split_batch(batch: &Array2<f32>, count: usize) -> Result<Vec<Microbatch>, RunError> {
    if count == 0 || batch.nrows() % count != 0 {
        run_error!(format!(
            "cannot split {} rows into {count} microbatches",
            batch.nrows()
        ));
    }
    let rows = batch.nrows() / count;
    Ok((0..count)
        .map(|index| {
            let slice = batch.slice(s![index * rows..(index + 1) * rows, ..]);
            Microbatch::new(index, slice.to_owned())
        })
        .collect())
}

/// Reassemble microbatches into one `[batch_rows, features]` batch.
pub fn join_batch(microbatches: &[Microbatch]) -> Result<Array2<f32>, RunError> {
    let views: Vec<_> = microbatches
        .iter()
        .map(|microbatch| microbatch.data.view())
        .collect();
    match concatenate(Axis(0), views.as_slice()) {
        Ok(batch) => Ok(batch),
        Err(e) => run_error!(format!("cannot join microbatches: {e}")),
    }
}
