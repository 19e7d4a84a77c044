// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Helpers for tests that need a running [`Engine`].

use roundhouse_track::test_helpers::create_tracker;

use crate::engine::Engine;

/// Create an [`Engine`] for a test, attributed to the calling test file.
///
/// ```rust
/// use roundhouse_engine::test_helpers::start_test;
///
/// let mut engine = start_test(file!());
/// engine.spawn(async { Ok(()) });
/// engine.run().unwrap();
/// ```
#[must_use]
pub fn start_test(full_filepath: &str) -> Engine {
    Engine::new(&create_tracker(full_filepath))
}
