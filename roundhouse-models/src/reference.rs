// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The unrolled reference: all layers applied directly, no pipelining.

use roundhouse_engine::traits::Payload;
use roundhouse_engine::types::RunError;
use roundhouse_pipeline::config::PipelineConfig;
use roundhouse_pipeline::stage::Stage;
use roundhouse_pipeline::weights::WeightStore;

/// Apply all `S*R` logical layers to every microbatch in sequence.
///
/// This computes exactly what a pipeline run must produce and is the
/// ground truth for end-to-end verification.
pub fn unrolled<W, T>(
    config: &PipelineConfig,
    weights: &WeightStore<W>,
    stage: &impl Stage<W, T>,
    inputs: Vec<T>,
) -> Result<Vec<T>, RunError>
where
    T: Payload,
{
    inputs
        .into_iter()
        .map(|mut value| {
            for layer in 0..config.num_layers() {
                value = stage.apply(weights.get(layer), value)?;
            }
            Ok(value)
        })
        .collect()
}
