// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing tracking output.
//!
//! The aim of this module is to provide commonly-used functions that
//! enable the testing of the output that should appear from the tracking
//! macros.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::tracker::{EntityManager, TextTracker, Track};
use crate::{Id, ROOT, Tracker};

/// A tracker that keeps track events in memory for checking later.
pub struct TestTracker {
    events: Mutex<Vec<String>>,

    unique_id: AtomicU64,

    names: Mutex<HashMap<Id, String>>,
}

impl TestTracker {
    /// Create a new [`TestTracker`].
    ///
    /// `initial_id` sets the first [`Id`] handed out, which keeps expected
    /// event strings stable when tests create entities in sequence.
    #[must_use]
    pub fn new(initial_id: u64) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            unique_id: AtomicU64::new(initial_id),
            names: Mutex::new(HashMap::new()),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        let mut events = self.events.lock().unwrap();
        events.push(event);
    }

    fn name(&self, id: Id) -> String {
        let names = self.names.lock().unwrap();
        match names.get(&id) {
            Some(name) => name.clone(),
            None => format!("{id}"),
        }
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        Id(self.unique_id.fetch_add(1, Ordering::SeqCst))
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.names
            .lock()
            .unwrap()
            .insert(id, String::from(entity_name));
        self.add_event(format!("{id}: {entity_name} registered"));
    }

    fn is_entity_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn enter(&self, enter_into: Id, enter_obj: Id) {
        self.add_event(format!("{}: {enter_obj} entered", self.name(enter_into)));
    }

    fn exit(&self, exit_from: Id, exit_obj: Id) {
        self.add_event(format!("{}: {exit_obj} exited", self.name(exit_from)));
    }

    fn log(&self, msg_by: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{}:{level}: {msg}", self.name(msg_by)));
    }

    fn shutdown(&self) {
        // Do nothing
    }
}

/// Create a [`TestTracker`] along with its shared [`Tracker`] handle.
///
/// The concrete handle is used for checking recorded events, the shared
/// handle for building entities.
#[must_use]
pub fn test_tracker_pair(initial_id: u64) -> (Arc<TestTracker>, Tracker) {
    let test_tracker = Arc::new(TestTracker::new(initial_id));
    let tracker: Tracker = test_tracker.clone();
    (test_tracker, tracker)
}

/// Assert that the recorded events match `expected`, then clear them.
///
/// # Panics
///
/// Panics when the recorded events differ from `expected`.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut events = tracker.events.lock().unwrap();
    assert_eq!(events.as_slice(), expected);
    events.clear();
}

/// Create a [`Tracker`] for a test.
///
/// Tests log warnings and errors to stdout by default; set
/// `ROUNDHOUSE_TEST_LOG` (for example to `trace`) to raise the level when
/// debugging a failure. The calling test file is registered as the first
/// entity so failures can be attributed.
#[must_use]
pub fn create_tracker(full_filepath: &str) -> Tracker {
    let level = std::env::var("ROUNDHOUSE_TEST_LOG")
        .ok()
        .and_then(|value| log::Level::from_str(value.as_str()).ok())
        .unwrap_or(log::Level::Warn);

    let manager = EntityManager::new(level);
    let writer = Box::new(std::io::stdout());
    let tracker: Tracker = Arc::new(TextTracker::new(manager, writer));

    let id = tracker.unique_id();
    debug_assert_eq!(id, ROOT);
    tracker.add_entity(id, full_filepath);
    tracker
}
