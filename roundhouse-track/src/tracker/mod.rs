// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Define the [`Track`] trait and a number of [`Tracker`]s.

/// Include the /dev/null tracker.
pub mod dev_null;
/// Include the text-based tracker.
pub mod text;

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use dev_null::DevNullTracker;
use regex::Regex;
pub use text::TextTracker;

use crate::{Id, ROOT};

/// This is the interface that is supported by all [`Tracker`]s.
pub trait Track {
    /// Allocate a new globally-unique [`Id`].
    fn unique_id(&self) -> Id;

    /// Register an entity name against its [`Id`].
    fn add_entity(&self, id: Id, entity_name: &str);

    /// Determine whether track events at `level` are enabled for an entity.
    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool;

    /// Track an object arriving at an entity.
    fn enter(&self, enter_into: Id, enter_obj: Id);

    /// Track an object leaving an entity.
    fn exit(&self, exit_from: Id, exit_obj: Id);

    /// Track a log message of the given level.
    fn log(&self, msg_by: Id, level: log::Level, msg: std::fmt::Arguments);

    /// Flush and close any outputs. Must be safe to call more than once.
    fn shutdown(&self);
}

/// The type of a [`Tracker`] that is shared across entities.
pub type Tracker = Arc<dyn Track + Send + Sync>;

/// Create a [`Tracker`] that prints warnings and errors to `stdout`.
///
/// This is provided to keep documentation examples simple with fewer
/// concepts to have to consider at once.
#[must_use]
pub fn stdout_tracker() -> Tracker {
    let manager = EntityManager::new(log::Level::Warn);
    let stdout_writer = Box::new(io::BufWriter::new(io::stdout()));
    Arc::new(TextTracker::new(manager, stdout_writer))
}

/// Create a [`Tracker`] that suppresses all track events.
#[must_use]
pub fn dev_null_tracker() -> Tracker {
    Arc::new(DevNullTracker::new())
}

struct EntityInfo {
    name: String,
    level: log::Level,
}

/// The [`EntityManager`] is responsible for determining per-entity log
/// levels and for allocating unique [`Id`] values.
///
/// Filters are regular expressions matched against the full hierarchical
/// entity name at registration time, first match wins. Entities matching
/// no filter use the default level.
pub struct EntityManager {
    /// Level of _log_ events to output when no filter matches.
    default_log_level: log::Level,

    /// List of regular expressions mapping entity names to log levels.
    regex_to_log_level: Vec<(Regex, log::Level)>,

    /// Used to assign unique ids.
    unique_id: AtomicU64,

    /// Registered entities, keyed by [`Id`].
    entities: Mutex<HashMap<Id, EntityInfo>>,
}

impl EntityManager {
    /// Create a manager with a default [`log::Level`] for all entities.
    #[must_use]
    pub fn new(default_log_level: log::Level) -> Self {
        Self {
            default_log_level,
            regex_to_log_level: Vec::new(),
            unique_id: AtomicU64::new(ROOT.0),
            entities: Mutex::new(HashMap::new()),
        }
    }

    /// Add a log filter regular expression.
    ///
    /// # Example
    ///
    /// ```rust
    /// use roundhouse_track::tracker::EntityManager;
    /// let mut manager = EntityManager::new(log::Level::Warn);
    /// manager.add_log_filter(".*scheduler.*", log::Level::Trace).unwrap();
    /// ```
    pub fn add_log_filter(
        &mut self,
        regex_str: &str,
        level: log::Level,
    ) -> Result<(), regex::Error> {
        let regex = Regex::new(regex_str)?;
        self.regex_to_log_level.push((regex, level));
        Ok(())
    }

    /// Allocate a new unique [`Id`].
    pub fn unique_id(&self) -> Id {
        Id(self.unique_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register an entity, resolving its log level from the filters.
    pub fn add_entity(&self, id: Id, entity_name: &str) {
        let level = self.log_level_for(entity_name);
        let mut entities = self.entities.lock().unwrap();
        entities.insert(
            id,
            EntityInfo {
                name: String::from(entity_name),
                level,
            },
        );
    }

    /// Whether events at `level` are enabled for the entity with `id`.
    pub fn is_enabled(&self, id: Id, level: log::Level) -> bool {
        let entities = self.entities.lock().unwrap();
        let enabled_level = match entities.get(&id) {
            Some(info) => info.level,
            None => self.default_log_level,
        };
        level <= enabled_level
    }

    /// The registered name for `id`, or the raw id when unregistered.
    #[must_use]
    pub fn name(&self, id: Id) -> String {
        let entities = self.entities.lock().unwrap();
        match entities.get(&id) {
            Some(info) => info.name.clone(),
            None => format!("{id}"),
        }
    }

    fn log_level_for(&self, entity_name: &str) -> log::Level {
        for (regex, level) in self.regex_to_log_level.iter() {
            if regex.is_match(entity_name) {
                return *level;
            }
        }
        self.default_log_level
    }
}
