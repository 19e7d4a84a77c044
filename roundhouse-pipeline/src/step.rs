// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The per-iteration transition: input selection, stage fan-out/join,
//! buffer update.
//!
//! Iterations are strictly sequential, but the `S` stage computations
//! within one iteration have no data dependency on each other: each is
//! spawned as its own executor task and the iteration driver waits on a
//! [`Barrier`] until all of them have reported before the buffers advance.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use itertools::izip;
use roundhouse_engine::events::barrier::Barrier;
use roundhouse_engine::executor::Spawner;
use roundhouse_engine::traits::{Event, Payload};
use roundhouse_engine::types::RunError;
use roundhouse_track::entity::Entity;
use roundhouse_track::{Id, enter, exit, trace};

use crate::buffers::BufferSet;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::stage::Stage;
use crate::weights::{WeightStore, layers_for_iteration};

type StageResults<T> = Rc<RefCell<Vec<Option<Result<T, RunError>>>>>;

/// Run one loop iteration, leaving `buffers` advanced by one step.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_iteration<W, T>(
    entity: &Arc<Entity>,
    stage_entities: &[Arc<Entity>],
    spawner: &Spawner,
    config: &PipelineConfig,
    weights: &Rc<WeightStore<W>>,
    stage: &Rc<dyn Stage<W, T>>,
    buffers: &mut BufferSet<T>,
    loop_iteration: usize,
) -> Result<(), PipelineError>
where
    W: 'static,
    T: Payload,
{
    let inputs = buffers.stage_inputs(loop_iteration);
    let layers = layers_for_iteration(config, loop_iteration);
    trace!(entity ; "iteration {loop_iteration}: stage 0 draws from {}, layers {layers:?}",
        if loop_iteration < config.microbatches { "state" } else { "circular storage" });

    let results: StageResults<T> = Rc::new(RefCell::new((0..config.stages).map(|_| None).collect()));
    let joined = Barrier::new(config.stages);

    for (stage_index, (input, layer)) in izip!(inputs, layers).enumerate() {
        let entity = stage_entities[stage_index].clone();
        let weights = weights.clone();
        let stage = stage.clone();
        let results = results.clone();
        let joined = joined.clone();
        spawner.spawn(async move {
            enter!(entity ; Id(loop_iteration as u64));
            let result = stage.apply(weights.get(layer), input);
            exit!(entity ; Id(loop_iteration as u64));
            results.borrow_mut()[stage_index] = Some(result);
            joined.arrive()
        });
    }

    joined.listen().await;

    let mut outputs = Vec::with_capacity(config.stages);
    for (stage_index, result) in results.borrow_mut().drain(..).enumerate() {
        match result {
            Some(Ok(output)) => outputs.push(output),
            Some(Err(error)) => {
                return Err(PipelineError::StageComputation {
                    stage: stage_index,
                    iteration: loop_iteration,
                    reason: error.0,
                });
            }
            None => {
                return Err(PipelineError::Engine(format!(
                    "stage {stage_index} never reported at iteration {loop_iteration}"
                )));
            }
        }
    }

    buffers.advance(outputs, loop_iteration);
    Ok(())
}
