// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The external stage computation boundary.

use roundhouse_engine::types::RunError;

/// A pure per-stage transform: `stage(weights, input) -> output`.
///
/// This is the scheduler's sole external collaborator. Implementations
/// must be side-effect free with respect to `weights` (the same entry may
/// be used by a later repeat) and must not retain references to `input`
/// beyond the call; both are required for the per-iteration fan-out to be
/// safe.
///
/// An error aborts the whole run: pipeline buffers after a partially
/// failed iteration are not self-consistent, so there is nothing useful to
/// resume from.
pub trait Stage<W, T> {
    /// Apply one logical layer's weights to one in-flight value.
    fn apply(&self, weights: &W, input: T) -> Result<T, RunError>;
}

/// Any matching `Fn` is a stage, which keeps tests and small models free
/// of wrapper types.
impl<W, T, F> Stage<W, T> for F
where
    F: Fn(&W, T) -> Result<T, RunError>,
{
    fn apply(&self, weights: &W, input: T) -> Result<T, RunError> {
        self(weights, input)
    }
}
