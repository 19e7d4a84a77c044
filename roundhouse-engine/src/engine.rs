// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The engine owns the executor, the top-level entity and the tracker for
//! one pipeline run.

use std::future::Future;
use std::sync::Arc;

use roundhouse_track::Tracker;
use roundhouse_track::entity::{Entity, toplevel};
use roundhouse_track::tracker::stdout_tracker;

use crate::executor::{self, Executor, Spawner};
use crate::types::RunResult;

/// A standalone engine.
pub struct Engine {
    /// The executor driving all spawned tasks.
    pub executor: Executor,
    spawner: Spawner,
    toplevel: Arc<Entity>,
    tracker: Tracker,
}

impl Engine {
    /// Create a standalone engine.
    #[must_use]
    pub fn new(tracker: &Tracker) -> Self {
        let toplevel = toplevel(tracker, "top");
        let (executor, spawner) = executor::new_executor_and_spawner(&toplevel);
        Self {
            executor,
            spawner,
            toplevel,
            tracker: tracker.clone(),
        }
    }

    /// Run all spawned tasks until none can make progress.
    pub fn run(&mut self) -> RunResult {
        self.executor.run()
    }

    /// Add a task to be run.
    pub fn spawn(&self, future: impl Future<Output = RunResult> + 'static) {
        self.executor.spawn(future);
    }

    /// A [`Spawner`] handle that tasks can use to spawn further tasks.
    #[must_use]
    pub fn spawner(&self) -> Spawner {
        self.spawner.clone()
    }

    /// The top-level entity under which all parts are created.
    #[must_use]
    pub fn top(&self) -> &Arc<Entity> {
        &self.toplevel
    }

    /// The engine's [`Tracker`].
    #[must_use]
    pub fn tracker(&self) -> Tracker {
        self.tracker.clone()
    }
}

/// Create a default engine that sends warnings and errors to stdout.
///
/// This is provided to keep documentation examples simple with fewer
/// concepts to have to consider at once.
impl Default for Engine {
    fn default() -> Self {
        let tracker = stdout_tracker();
        Self::new(&tracker)
    }
}
