// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A tracker that drops every event.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::tracker::Track;
use crate::{Id, ROOT};

/// Tracker for which all events are suppressed.
///
/// Ids must still be unique so that entities created against this tracker
/// remain distinguishable if a real tracker is swapped in by tests.
pub struct DevNullTracker {
    unique_id: AtomicU64,
}

impl DevNullTracker {
    /// Create a new [`DevNullTracker`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            unique_id: AtomicU64::new(ROOT.0),
        }
    }
}

impl Default for DevNullTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Track for DevNullTracker {
    fn unique_id(&self) -> Id {
        Id(self.unique_id.fetch_add(1, Ordering::SeqCst))
    }

    fn add_entity(&self, _id: Id, _entity_name: &str) {
        // Do nothing
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        false
    }

    fn enter(&self, _enter_into: Id, _enter_obj: Id) {
        // Do nothing
    }

    fn exit(&self, _exit_from: Id, _exit_obj: Id) {
        // Do nothing
    }

    fn log(&self, _msg_by: Id, _level: log::Level, _msg: std::fmt::Arguments) {
        // Do nothing
    }

    fn shutdown(&self) {
        // Do nothing
    }
}
