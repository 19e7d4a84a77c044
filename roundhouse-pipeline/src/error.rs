// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Errors surfaced at the pipeline boundary.

use std::error::Error;
use std::fmt;

use roundhouse_engine::types::RunError;

/// The failure conditions a pipeline run can report.
///
/// There are deliberately no retries anywhere: a failed stage invocation
/// leaves the pipeline buffers mid-iteration and therefore invalidates the
/// whole run.
#[derive(Debug)]
pub enum PipelineError {
    /// The problem sizes cannot be laid out as pipeline buffers. Detected
    /// eagerly, before any buffer is allocated or stage invoked.
    InvalidConfiguration(String),

    /// The external stage function faulted. The run is aborted immediately
    /// and no partial output is returned.
    StageComputation {
        /// Physical stage that faulted.
        stage: usize,
        /// Loop iteration at which it faulted.
        iteration: usize,
        /// The stage function's own error message.
        reason: String,
    },

    /// The executor stopped without the scheduler producing its output.
    Engine(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {msg}")
            }
            PipelineError::StageComputation {
                stage,
                iteration,
                reason,
            } => {
                write!(f, "stage {stage} failed at iteration {iteration}: {reason}")
            }
            PipelineError::Engine(msg) => {
                write!(f, "engine: {msg}")
            }
        }
    }
}

impl Error for PipelineError {}

impl From<PipelineError> for RunError {
    fn from(error: PipelineError) -> Self {
        RunError(format!("{error}"))
    }
}
