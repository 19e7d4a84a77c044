// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module provides combined _track_ capabilities for the Roundhouse
//! project.
//!
//! _Track_ means the combination of _log_ and _trace_ where:
//!
//!   - _log_ are text-based human-readable messages emitted at various levels
//!     of verbosity (from `Trace` through to `Error`).
//!   - _trace_ provides a standard set of pipeline events that can be
//!     emitted. For example, microbatches entering/exiting simulation
//!     [`Entities`](crate::entity::Entity) such as pipeline stages.
//!
//! All _track_ events are emitted through a [`Tracker`], keyed by the
//! [`Id`] of the [`Entity`](crate::entity::Entity) that produced them. The
//! textual output is based on the [log](https://docs.rs/log) crate's level
//! taxonomy.

// Enable warnings for missing documentation
#![warn(missing_docs)]

use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub use log;

pub mod builder;
pub mod entity;
pub mod test_helpers;

/// Include the trackers.
pub mod tracker;
pub use tracker::{Track, Tracker};

/// A type alias for sinks that receive _log_ / _trace_ events.
///
/// The writer must implement Send in order to be shared between threads.
pub type Writer = Box<dyn std::io::Write + Send>;
type SharedWriter = Arc<Mutex<Writer>>;

/// Type used for unique entity/object identifiers.
///
/// Every [`Entity`](crate::entity::Entity) within the application is given
/// a unique `Id`. Objects that move between entities (for example
/// microbatches moving between pipeline stages) may also carry an `Id` so
/// that [`enter!`]/[`exit!`] events can be correlated.
#[derive(Copy, Clone, Default, Eq, Hash, PartialEq)]
pub struct Id(pub u64);

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id value which indicates that there is no valid source.
pub const NO_ID: Id = Id(0);

/// The root id from which all other ids are derived.
pub const ROOT: Id = Id(1);

/// Take a command-line string and convert it to a [`log::Level`].
#[must_use]
pub fn str_to_level(lvl: &str) -> log::Level {
    match log::Level::from_str(lvl) {
        Ok(level) => level,
        Err(_) => panic!("Unable to parse level string '{lvl}'"),
    }
}

/// Track an object entering an entity.
///
/// The object is identified by an [`Id`], for example the microbatch index
/// of a value arriving at a pipeline stage.
#[macro_export]
macro_rules! enter {
    ($entity:expr ; $obj:expr) => {
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            $entity.tracker.enter($entity.id, $obj);
        }
    };
}

/// Track an object exiting an entity.
#[macro_export]
macro_rules! exit {
    ($entity:expr ; $obj:expr) => {
        if $entity
            .tracker
            .is_entity_enabled($entity.id, $crate::log::Level::Trace)
        {
            $entity.tracker.exit($entity.id, $obj);
        }
    };
}

/// Base macro for log messages of all levels.
///
/// This wrapper checks the per-entity enable state before formatting so
/// that disabled entities pay no formatting cost.
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $lvl:expr, $($arg:tt)+) => (
        if $entity.tracker.is_entity_enabled($entity.id, $lvl) {
            $entity.tracker.log($entity.id, $lvl, format_args!($($arg)+));
        }
    );
}

/// The `trace` macro provides a wrapper for [`log_base!`] at level
/// `log::Level::Trace`.
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+);
    );
}

/// The `debug` macro provides a wrapper for [`log_base!`] at level
/// `log::Level::Debug`.
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+);
    );
}

/// The `info` macro provides a wrapper for [`log_base!`] at level
/// `log::Level::Info`.
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+);
    );
}

/// The `warn` macro provides a wrapper for [`log_base!`] at level
/// `log::Level::Warn`.
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+);
    );
}

/// The `error` macro provides a wrapper for [`log_base!`] at level
/// `log::Level::Error`.
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+);
    );
}
