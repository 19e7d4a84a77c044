// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Deterministic weight and input generation.
//!
//! Everything is seeded so that a run can be reproduced exactly from its
//! command line.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::microbatch::Microbatch;

/// Uniform random `[features, features]` weights for every logical layer.
#[must_use]
pub fn random_weights(num_layers: usize, features: usize, seed: u64) -> Vec<Array2<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_layers)
        .map(|_| Array2::from_shape_fn((features, features), |_| rng.gen_range(-1.0..1.0)))
        .collect()
}

/// Uniform random microbatches of `[rows, features]` activations.
#[must_use]
pub fn random_microbatches(count: usize, rows: usize, features: usize, seed: u64) -> Vec<Microbatch> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            Microbatch::new(
                index,
                Array2::from_shape_fn((rows, features), |_| rng.gen_range(-1.0..1.0)),
            )
        })
        .collect()
}

/// The same constant weight for every logical layer.
#[must_use]
pub fn debug_weights(num_layers: usize, value: f32) -> Vec<f32> {
    vec![value; num_layers]
}
