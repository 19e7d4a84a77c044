// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use roundhouse_engine::test_helpers::start_test;
use roundhouse_models::generate::{debug_weights, random_microbatches, random_weights};
use roundhouse_models::layers::{add_scalar, dense, identity};
use roundhouse_models::microbatch::{Microbatch, join_batch, split_batch};
use roundhouse_models::reference::unrolled;
use roundhouse_pipeline::config::PipelineConfig;
use roundhouse_pipeline::scheduler::run_pipeline_on;
use roundhouse_pipeline::weights::WeightStore;

#[test]
fn dense_pipeline_matches_unrolled_reference() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(2, 4, 2).unwrap();

    let layers = random_weights(config.num_layers(), 3, 1);
    let inputs = random_microbatches(config.microbatches, 2, 3, 2);

    let expected = unrolled(
        &config,
        &WeightStore::from_layers(layers.clone()),
        &dense,
        inputs.clone(),
    )
    .unwrap();

    let weights = WeightStore::from_layers(layers);
    let output = run_pipeline_on(&mut engine, &config, weights, dense, inputs).unwrap();

    assert_eq!(output.len(), expected.len());
    for (out, exp) in output.iter().zip(expected.iter()) {
        assert_eq!(out.index, exp.index);
        for (a, b) in out.data.iter().zip(exp.data.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }
}

#[test]
fn add_scalar_pipeline_matches_unrolled_reference() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(2, 4, 2).unwrap();

    let inputs = random_microbatches(config.microbatches, 1, 2, 3);
    let expected = unrolled(
        &config,
        &WeightStore::from_layers(debug_weights(config.num_layers(), 100.0)),
        &add_scalar,
        inputs.clone(),
    )
    .unwrap();

    let weights = WeightStore::from_layers(debug_weights(config.num_layers(), 100.0));
    let output = run_pipeline_on(&mut engine, &config, weights, add_scalar, inputs).unwrap();

    // Both sides apply the same additions in the same order.
    assert_eq!(output, expected);
}

#[test]
fn identity_pipeline_preserves_microbatches() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(4, 8, 1).unwrap();

    let inputs = random_microbatches(config.microbatches, 2, 3, 4);
    let weights = WeightStore::from_layers(vec![(); config.num_layers()]);
    let output = run_pipeline_on(&mut engine, &config, weights, identity, inputs.clone()).unwrap();

    assert_eq!(output, inputs);
}

#[test]
fn layers_pass_the_empty_placeholder_through() {
    let weights = Array2::zeros((3, 3));
    let out = dense(&weights, Microbatch::default()).unwrap();
    assert_eq!(out, Microbatch::default());

    let out = add_scalar(&1.0, Microbatch::default()).unwrap();
    assert_eq!(out, Microbatch::default());
}

#[test]
fn dense_rejects_feature_mismatch() {
    let weights = Array2::zeros((3, 3));
    let input = Microbatch::new(0, Array2::zeros((2, 4)));
    assert!(dense(&weights, input).is_err());
}

#[test]
fn batches_split_and_join_in_row_order() {
    let batch = Array2::from_shape_fn((6, 4), |(row, col)| (row * 4 + col) as f32);

    let microbatches = split_batch(&batch, 3).unwrap();
    assert_eq!(microbatches.len(), 3);
    assert_eq!(microbatches[1].index, 1);
    assert_eq!(microbatches[1].data.nrows(), 2);

    let joined = join_batch(&microbatches).unwrap();
    assert_eq!(joined, batch);

    assert!(split_batch(&batch, 4).is_err());
}

#[test]
fn generation_is_reproducible_from_the_seed() {
    assert_eq!(random_weights(3, 4, 7), random_weights(3, 4, 7));
    assert_ne!(random_weights(3, 4, 7), random_weights(3, 4, 8));
    assert_eq!(
        random_microbatches(2, 3, 4, 7),
        random_microbatches(2, 3, 4, 7)
    );
}
