// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Build a [`Tracker`] from command-line style options.
//!
//! Binaries share the same small set of tracking flags (see
//! `demos/sim-loop`): an enable for console output, a level, an optional
//! per-entity filter regex and an optional log file. This module turns
//! those options into a ready-to-use [`Tracker`].

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use crate::tracker::{EntityManager, TextTracker, dev_null_tracker};
use crate::{Tracker, Writer};

/// Create a [`Tracker`] from command-line style options.
///
/// When `filter_regex` is non-empty, entities whose full name matches it
/// log at `level` and all other entities log errors only. With an empty
/// filter every entity logs at `level`.
///
/// A `log_file` takes precedence over console output; when neither output
/// is requested all events are suppressed.
///
/// # Errors
///
/// Fails when the log file cannot be created or the filter regex does not
/// parse.
pub fn setup_tracker(
    stdout: bool,
    level: log::Level,
    filter_regex: &str,
    log_file: Option<&Path>,
) -> io::Result<Tracker> {
    if !stdout && log_file.is_none() {
        return Ok(dev_null_tracker());
    }

    let manager = if filter_regex.is_empty() {
        EntityManager::new(level)
    } else {
        let mut manager = EntityManager::new(log::Level::Error);
        manager
            .add_log_filter(filter_regex, level)
            .map_err(io::Error::other)?;
        manager
    };

    let writer: Writer = match log_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    Ok(std::sync::Arc::new(TextTracker::new(manager, writer)))
}
