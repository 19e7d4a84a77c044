// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A pipeline entity.
//!
//! All parts of a pipeline should contain an entity in order to maintain a
//! hierarchy of named parts. They contain a name and a unique [`Id`] for
//! tracking.

use std::fmt;
use std::sync::Arc;

use crate::{Id, Tracker};

/// A pipeline entity.
///
/// An entity is part of a hierarchy in which it must have a parent. The
/// top-level should be created using [`toplevel`].
///
/// The entity is used when logging so that messages can be attributed to
/// the part of the pipeline that emitted them, and so that per-entity
/// level filtering can be applied.
pub struct Entity {
    /// Name of this entity.
    pub name: String,

    /// Optional parent entity (only the top-level should be None).
    pub parent: Option<Arc<Entity>>,

    /// Unique identifier used for track events.
    pub id: Id,

    /// [`Tracker`] used to handle track events.
    pub tracker: Tracker,
}

static JOIN: &str = "::";

impl Entity {
    /// Create a new entity below `parent`.
    #[must_use]
    pub fn new(parent: &Arc<Entity>, name: &str) -> Self {
        let tracker = parent.tracker.clone();
        let id = tracker.unique_id();

        let entity = Self {
            name: String::from(name),
            parent: Some(parent.clone()),
            id,
            tracker,
        };
        entity.tracker.add_entity(id, entity.full_name().as_str());

        entity
    }

    /// Returns the full hierarchical name of this entity.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.parent {
            Some(parent) => {
                let mut name = parent.full_name();
                name.push_str(JOIN);
                name.push_str(self.name.as_str());
                name
            }
            None => self.name.clone(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("id", &self.id)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            parent.fmt(f)?;
            write!(f, "{}{}", JOIN, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Create the top-level entity. This should be the only entity without a
/// parent.
#[must_use]
pub fn toplevel(tracker: &Tracker, name: &str) -> Arc<Entity> {
    let id = tracker.unique_id();
    tracker.add_entity(id, name);
    Arc::new(Entity {
        parent: None,
        name: String::from(name),
        id,
        tracker: tracker.clone(),
    })
}
