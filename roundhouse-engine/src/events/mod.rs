// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Events that tasks can wait on.

pub mod barrier;
pub mod repeated;
