// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

#[macro_export]
/// Build a [RunError] from a message that supports `to_string`
macro_rules! run_error {
    ($msg:expr) => {
        Err($crate::types::RunError($msg.to_string()))?
    };
}

/// The `RunError` is what should be returned in the case of an error
#[derive(Debug)]
pub struct RunError(pub String);

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl Error for RunError {}

/// The RunResult is the return type for most pipeline task functions
pub type RunResult = Result<(), RunError>;
