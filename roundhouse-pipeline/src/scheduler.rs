// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The scheduler drives the iteration step for a whole run and reassembles
//! the final output.
//!
//! # Ownership
//!
//! The scheduler exclusively owns its [`BufferSet`] for the duration of
//! the run; no external mutation is possible between iterations. Inputs
//! are consumed when the run starts and the reassembled output is
//! collected afterwards with [`Scheduler::take_output`], mirroring how
//! results are read back from components once the engine has stopped.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use async_trait::async_trait;
use roundhouse_engine::engine::Engine;
use roundhouse_engine::events::repeated::Repeated;
use roundhouse_engine::executor::Spawner;
use roundhouse_engine::run_error;
use roundhouse_engine::traits::{Payload, Runnable};
use roundhouse_engine::types::{RunError, RunResult};
use roundhouse_model_builder::EntityDisplay;
use roundhouse_track::entity::Entity;
use roundhouse_track::{debug, error, info};

use crate::buffers::BufferSet;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::stage::Stage;
use crate::step::run_iteration;
use crate::weights::WeightStore;

/// Drives a circular pipeline run. See the module documentation.
#[derive(EntityDisplay)]
pub struct Scheduler<W, T>
where
    W: 'static,
    T: Payload,
{
    /// Entity for attributing scheduler track events.
    pub entity: Arc<Entity>,
    spawner: Spawner,
    config: PipelineConfig,
    weights: Rc<WeightStore<W>>,
    stage: Rc<dyn Stage<W, T>>,
    stage_entities: Vec<Arc<Entity>>,
    inputs: RefCell<Option<Vec<T>>>,
    iteration_done: Repeated<usize>,
    output: RefCell<Option<Result<Vec<T>, PipelineError>>>,
}

impl<W, T> Scheduler<W, T>
where
    W: 'static,
    T: Payload,
{
    /// Create a scheduler for one run.
    ///
    /// All configuration errors are reported here, before any buffer is
    /// allocated or stage invoked.
    pub fn new(
        parent: &Arc<Entity>,
        name: &str,
        spawner: Spawner,
        config: PipelineConfig,
        weights: WeightStore<W>,
        stage: impl Stage<W, T> + 'static,
        inputs: Vec<T>,
    ) -> Result<Rc<Self>, PipelineError> {
        config.validate()?;
        weights.validate_for(&config)?;
        if inputs.len() != config.microbatches {
            return Err(PipelineError::InvalidConfiguration(format!(
                "expected {} input microbatches, got {}",
                config.microbatches,
                inputs.len()
            )));
        }

        let entity = Arc::new(Entity::new(parent, name));
        let stage_entities = (0..config.stages)
            .map(|index| Arc::new(Entity::new(&entity, format!("stage{index}").as_str())))
            .collect();

        Ok(Rc::new(Self {
            entity,
            spawner,
            config,
            weights: Rc::new(weights),
            stage: Rc::new(stage),
            stage_entities,
            inputs: RefCell::new(Some(inputs)),
            iteration_done: Repeated::new(0),
            output: RefCell::new(None),
        }))
    }

    /// The validated configuration for this run.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Event notified with the index of every completed iteration.
    ///
    /// Observers (such as a progress task) get the latest completed index
    /// when they are next polled.
    #[must_use]
    pub fn iteration_done(&self) -> Repeated<usize> {
        self.iteration_done.clone()
    }

    /// Collect the run's result. Returns `None` while the run has not
    /// finished.
    #[must_use]
    pub fn take_output(&self) -> Option<Result<Vec<T>, PipelineError>> {
        self.output.borrow_mut().take()
    }
}

#[async_trait(?Send)]
impl<W, T> Runnable for Scheduler<W, T>
where
    W: 'static,
    T: Payload,
{
    async fn run(&self) -> RunResult {
        let inputs = match self.inputs.borrow_mut().take() {
            Some(inputs) => inputs,
            None => run_error!(format!("{}: already run", self.entity)),
        };

        // new() validated everything the buffers check again.
        let mut buffers = match BufferSet::new(&self.config, inputs) {
            Ok(buffers) => buffers,
            Err(e) => {
                let run_error = RunError(format!("{e}"));
                *self.output.borrow_mut() = Some(Err(e));
                return Err(run_error);
            }
        };

        let total = self.config.total_iterations();
        debug!(self.entity ; "{} iterations: {} microbatches over {} stages, {} repeats",
            total, self.config.microbatches, self.config.stages, self.config.repeats);

        for loop_iteration in 0..total {
            let step = run_iteration(
                &self.entity,
                &self.stage_entities,
                &self.spawner,
                &self.config,
                &self.weights,
                &self.stage,
                &mut buffers,
                loop_iteration,
            )
            .await;
            if let Err(e) = step {
                error!(self.entity ; "aborting: {e}");
                let run_error = RunError(format!("{e}"));
                *self.output.borrow_mut() = Some(Err(e));
                return Err(run_error);
            }
            self.iteration_done.notify_result(loop_iteration)?;
        }

        info!(self.entity ; "complete: {} microbatches through {} logical layers",
            self.config.microbatches, self.config.num_layers());
        *self.output.borrow_mut() = Some(Ok(buffers.into_output()));
        Ok(())
    }
}

/// Run a pipeline on an existing engine, blocking until it completes.
///
/// The caller's `inputs` are consumed; the reassembled output preserves
/// their microbatch order.
pub fn run_pipeline_on<W, T>(
    engine: &mut Engine,
    config: &PipelineConfig,
    weights: WeightStore<W>,
    stage: impl Stage<W, T> + 'static,
    inputs: Vec<T>,
) -> Result<Vec<T>, PipelineError>
where
    W: 'static,
    T: Payload,
{
    let scheduler = Scheduler::new(
        engine.top(),
        "scheduler",
        engine.spawner(),
        config.clone(),
        weights,
        stage,
        inputs,
    )?;

    {
        let scheduler = scheduler.clone();
        engine.spawn(async move { scheduler.run().await });
    }
    let run_result = engine.run();

    match scheduler.take_output() {
        Some(result) => result,
        None => Err(PipelineError::Engine(match run_result {
            Ok(()) => String::from("run ended without producing output"),
            Err(e) => e.0,
        })),
    }
}

/// Run a pipeline on a default engine.
pub fn run_pipeline<W, T>(
    config: &PipelineConfig,
    weights: WeightStore<W>,
    stage: impl Stage<W, T> + 'static,
    inputs: Vec<T>,
) -> Result<Vec<T>, PipelineError>
where
    W: 'static,
    T: Payload,
{
    let mut engine = Engine::default();
    run_pipeline_on(&mut engine, config, weights, stage, inputs)
}
