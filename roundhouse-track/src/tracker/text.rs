// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A simple text tracker to output messages to a [`Writer`].

use std::sync::{Arc, Mutex};

use crate::tracker::{EntityManager, Track};
use crate::{Id, SharedWriter, Writer};

/// A text tracker writing one line per track event.
pub struct TextTracker {
    entity_manager: EntityManager,

    /// Writer to which all track events will be written.
    writer: SharedWriter,
}

impl TextTracker {
    /// Create a new [`TextTracker`] with an [`EntityManager`].
    #[must_use]
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    fn write_line(&self, line: String) {
        let mut writer = self.writer.lock().unwrap();
        writer.write_all(line.as_bytes()).unwrap();
        writer.write_all(b"\n").unwrap();
    }
}

/// Implementation for each [`Track`] event.
impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_enabled(id, level)
    }

    fn enter(&self, enter_into: Id, enter_obj: Id) {
        self.write_line(format!(
            "{}: enter {enter_obj}",
            self.entity_manager.name(enter_into)
        ));
    }

    fn exit(&self, exit_from: Id, exit_obj: Id) {
        self.write_line(format!(
            "{}: exit {exit_obj}",
            self.entity_manager.name(exit_from)
        ));
    }

    fn log(&self, msg_by: Id, level: log::Level, msg: std::fmt::Arguments) {
        self.write_line(format!(
            "{level:5} {}: {msg}",
            self.entity_manager.name(msg_by)
        ));
    }

    fn shutdown(&self) {
        self.writer.lock().unwrap().flush().unwrap();
    }
}

impl Drop for TextTracker {
    fn drop(&mut self) {
        // Make sure buffered lines reach the sink even without an explicit
        // shutdown() call.
        let _ = self.writer.lock().unwrap().flush();
    }
}
