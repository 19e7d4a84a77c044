// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Immutable problem parameters for one pipeline run.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// The problem sizes: stage count `S`, microbatch count `M` and repeat
/// count `R`.
///
/// The buffer layouts assume `M % S == 0`; [`PipelineConfig::validate`]
/// enforces this along with non-zero sizes. Validated once, read-only
/// thereafter.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Number of physical compute stages (`S`).
    pub stages: usize,

    /// Number of microbatches per full pass (`M`).
    pub microbatches: usize,

    /// Number of times each physical stage is reused (`R`).
    pub repeats: usize,
}

impl PipelineConfig {
    /// Create a validated configuration.
    pub fn new(
        stages: usize,
        microbatches: usize,
        repeats: usize,
    ) -> Result<Self, PipelineError> {
        let config = Self {
            stages,
            microbatches,
            repeats,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the recognized constraints.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.stages == 0 || self.microbatches == 0 || self.repeats == 0 {
            return Err(PipelineError::InvalidConfiguration(format!(
                "all sizes must be non-zero (stages={}, microbatches={}, repeats={})",
                self.stages, self.microbatches, self.repeats
            )));
        }
        if self.microbatches % self.stages != 0 {
            return Err(PipelineError::InvalidConfiguration(format!(
                "{} microbatches cannot be divided over {} stages",
                self.microbatches, self.stages
            )));
        }
        // The circular handoff is written S iterations after production
        // and consumed M iterations after the write. With M == S the
        // consume lands on the write's own iteration, before the write
        // has happened, so a second repeat would read stale values.
        if self.repeats > 1 && self.microbatches == self.stages {
            return Err(PipelineError::InvalidConfiguration(format!(
                "with {} repeats there must be more microbatches than the {} stages",
                self.repeats, self.stages
            )));
        }
        Ok(())
    }

    /// Microbatch slots per stage in the state buffer (`M / S`).
    #[must_use]
    pub fn slots(&self) -> usize {
        self.microbatches / self.stages
    }

    /// Total loop iterations: `M*R + S - 1`.
    ///
    /// The `S - 1` term is the fill/drain bubble; fewer iterations would
    /// leave stages starved or outputs incomplete.
    #[must_use]
    pub fn total_iterations(&self) -> usize {
        self.microbatches * self.repeats + self.stages - 1
    }

    /// Number of logical layers (`S * R`).
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.stages * self.repeats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_divisible_sizes() {
        let config = PipelineConfig::new(4, 8, 3).unwrap();
        assert_eq!(config.slots(), 2);
        assert_eq!(config.total_iterations(), 27);
        assert_eq!(config.num_layers(), 12);
    }

    #[test]
    fn single_stage_has_no_bubble() {
        let config = PipelineConfig::new(1, 3, 2).unwrap();
        assert_eq!(config.total_iterations(), 6);
    }

    #[test]
    fn rejects_non_divisible_microbatches() {
        let err = PipelineConfig::new(4, 6, 1).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_repeats_without_circular_headroom() {
        assert!(PipelineConfig::new(4, 4, 2).is_err());
        assert!(PipelineConfig::new(4, 4, 1).is_ok());
        assert!(PipelineConfig::new(4, 8, 2).is_ok());
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(PipelineConfig::new(0, 8, 1).is_err());
        assert!(PipelineConfig::new(4, 0, 1).is_err());
        assert!(PipelineConfig::new(4, 8, 0).is_err());
    }
}
