// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Weight selection under stage repetition.
//!
//! With `R` repeats, physical stage `k` is responsible for logical layers
//! `k`, `k + S`, `k + 2S`, ... Which of these applies on a given loop
//! iteration depends on how far the stage's current microbatch has
//! progressed, which in turn lags the iteration counter by the stage
//! index.

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// An indexable collection of opaque per-layer weights, keyed by logical
/// layer id `0 .. S*R`.
///
/// Entries are handed unmodified to the stage function.
pub struct WeightStore<W> {
    layers: Vec<W>,
}

impl<W> WeightStore<W> {
    /// Wrap per-layer weights, ordered by logical layer id.
    #[must_use]
    pub fn from_layers(layers: Vec<W>) -> Self {
        Self { layers }
    }

    /// Number of logical layers held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the store holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The weights for one logical layer.
    #[must_use]
    pub fn get(&self, layer: usize) -> &W {
        &self.layers[layer]
    }

    pub(crate) fn validate_for(&self, config: &PipelineConfig) -> Result<(), PipelineError> {
        if self.layers.len() != config.num_layers() {
            return Err(PipelineError::InvalidConfiguration(format!(
                "weight store holds {} layers, configuration needs {}",
                self.layers.len(),
                config.num_layers()
            )));
        }
        Ok(())
    }
}

/// The logical layer whose weights `stage` must use on `loop_iteration`.
///
/// The stage's microbatch-position counter is `loop_iteration - stage`,
/// clamped at zero while the pipeline fills. During the final drain bubble
/// the computed id can pass the last layer; it is clamped there rather
/// than rejected, because the value computed from it is bubble data that
/// is never read back.
#[must_use]
pub fn layer_for(config: &PipelineConfig, loop_iteration: usize, stage: usize) -> usize {
    let position = loop_iteration.saturating_sub(stage);
    let repeat = position / config.microbatches;
    let layer = stage + repeat * config.stages;
    layer.min(config.num_layers() - 1)
}

/// The layer id for every stage `0..S` on one iteration.
#[must_use]
pub fn layers_for_iteration(config: &PipelineConfig, loop_iteration: usize) -> Vec<usize> {
    (0..config.stages)
        .map(|stage| layer_for(config, loop_iteration, stage))
        .collect()
}
