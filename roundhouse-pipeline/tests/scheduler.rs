// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use roundhouse_engine::test_helpers::start_test;
use roundhouse_engine::traits::Runnable;
use roundhouse_engine::types::RunError;
use roundhouse_pipeline::config::PipelineConfig;
use roundhouse_pipeline::error::PipelineError;
use roundhouse_pipeline::scheduler::{Scheduler, run_pipeline_on};
use roundhouse_pipeline::weights::WeightStore;

fn add(weights: &f32, input: f32) -> Result<f32, RunError> {
    Ok(input + weights)
}

fn identity(_weights: &f32, input: f32) -> Result<f32, RunError> {
    Ok(input)
}

#[test]
fn single_stage_matches_unrolled_reference() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(1, 3, 2).unwrap();
    let weights = WeightStore::from_layers(vec![10.0, 20.0]);

    let output =
        run_pipeline_on(&mut engine, &config, weights, add, vec![1.0, 2.0, 3.0]).unwrap();

    // No pipelining with one stage: every microbatch simply gains both
    // layer weights in sequence.
    assert_eq!(output, vec![31.0, 32.0, 33.0]);
}

#[test]
fn repeats_apply_every_layer_exactly_once() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(2, 4, 2).unwrap();
    // Distinct powers: any dropped, repeated or bubble-leaked layer
    // application would show up in the sums.
    let weights = WeightStore::from_layers(vec![1.0, 10.0, 100.0, 1000.0]);

    let inputs: Vec<f32> = (1..=4).map(|m| m as f32).collect();
    let output = run_pipeline_on(&mut engine, &config, weights, add, inputs).unwrap();

    assert_eq!(output, vec![1112.0, 1113.0, 1114.0, 1115.0]);
}

#[test]
fn deep_pipeline_matches_direct_sums() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(4, 8, 3).unwrap();
    let layers: Vec<f32> = (0..config.num_layers()).map(|layer| layer as f32).collect();
    let total: f32 = layers.iter().sum();
    let weights = WeightStore::from_layers(layers);

    let inputs: Vec<f32> = (0..8).map(|m| m as f32).collect();
    let expected: Vec<f32> = inputs.iter().map(|input| input + total).collect();

    let output = run_pipeline_on(&mut engine, &config, weights, add, inputs).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn identity_run_preserves_microbatch_order() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(2, 4, 1).unwrap();
    let weights = WeightStore::from_layers(vec![0.0, 0.0]);

    let inputs = vec![10.0, 20.0, 30.0, 40.0];
    let output = run_pipeline_on(&mut engine, &config, weights, identity, inputs.clone()).unwrap();

    assert_eq!(output, inputs);
}

#[test]
fn stage_fault_aborts_with_no_output() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(2, 4, 1).unwrap();
    let weights = WeightStore::from_layers(vec![0.0, 0.0]);

    let faulty = |_w: &f32, input: f32| -> Result<f32, RunError> {
        if input == 30.0 {
            return Err(RunError(String::from("numerical fault")));
        }
        Ok(input)
    };

    let inputs = vec![10.0, 20.0, 30.0, 40.0];
    let err = run_pipeline_on(&mut engine, &config, weights, faulty, inputs).unwrap_err();

    // Microbatch index 2 reaches stage 0 on iteration 2.
    match err {
        PipelineError::StageComputation {
            stage,
            iteration,
            reason,
        } => {
            assert_eq!(stage, 0);
            assert_eq!(iteration, 2);
            assert_eq!(reason, "numerical fault");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn configuration_errors_are_eager() {
    let engine = start_test(file!());
    let spawner = engine.spawner();

    // Non-divisible microbatch count.
    let bad_config = PipelineConfig {
        stages: 4,
        microbatches: 6,
        repeats: 1,
    };
    let result = Scheduler::new(
        engine.top(),
        "scheduler",
        spawner.clone(),
        bad_config,
        WeightStore::from_layers(vec![0.0_f32; 4]),
        identity,
        vec![0.0; 6],
    );
    assert!(matches!(
        result.err(),
        Some(PipelineError::InvalidConfiguration(_))
    ));

    // Weight store does not cover S*R layers.
    let config = PipelineConfig::new(2, 4, 2).unwrap();
    let result = Scheduler::new(
        engine.top(),
        "scheduler",
        spawner.clone(),
        config.clone(),
        WeightStore::from_layers(vec![0.0_f32; 3]),
        identity,
        vec![0.0; 4],
    );
    assert!(matches!(
        result.err(),
        Some(PipelineError::InvalidConfiguration(_))
    ));

    // Wrong number of input microbatches.
    let result = Scheduler::new(
        engine.top(),
        "scheduler",
        spawner,
        config,
        WeightStore::from_layers(vec![0.0_f32; 4]),
        identity,
        vec![0.0; 5],
    );
    assert!(matches!(
        result.err(),
        Some(PipelineError::InvalidConfiguration(_))
    ));
}

#[test]
fn iteration_event_reports_progress() {
    let mut engine = start_test(file!());
    let config = PipelineConfig::new(2, 4, 1).unwrap();
    let total = config.total_iterations();

    let scheduler = Scheduler::new(
        engine.top(),
        "scheduler",
        engine.spawner(),
        config,
        WeightStore::from_layers(vec![0.0, 0.0]),
        identity,
        vec![1.0, 2.0, 3.0, 4.0],
    )
    .unwrap();

    let last_seen = std::rc::Rc::new(std::cell::Cell::new(0));
    {
        use roundhouse_engine::traits::Event;
        let event = scheduler.iteration_done();
        let last_seen = last_seen.clone();
        engine.spawn(async move {
            loop {
                let iteration = event.listen().await;
                last_seen.set(iteration);
                if iteration + 1 == total {
                    return Ok(());
                }
            }
        });
    }
    {
        let scheduler = scheduler.clone();
        engine.spawn(async move { scheduler.run().await });
    }
    engine.run().unwrap();

    assert_eq!(last_seen.get(), total - 1);
    assert!(scheduler.take_output().unwrap().is_ok());
}
