// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Run a circular pipeline of dense layers over a random batch and check
//! the result against the unrolled reference.
//!
//! The pipeline sizes are layered from built-in defaults, an optional TOML
//! file (`--config`), `SIM_LOOP_*` environment variables and finally
//! explicit command-line flags.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use indicatif::ProgressBar;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roundhouse_engine::engine::Engine;
use roundhouse_engine::run_error;
use roundhouse_engine::traits::{Event, Runnable};
use roundhouse_engine::types::RunError;
use roundhouse_models::generate::random_weights;
use roundhouse_models::layers::dense;
use roundhouse_models::microbatch::{join_batch, split_batch};
use roundhouse_models::reference::unrolled;
use roundhouse_pipeline::config::PipelineConfig;
use roundhouse_pipeline::scheduler::Scheduler;
use roundhouse_pipeline::weights::WeightStore;
use roundhouse_track::builder::setup_tracker;
use roundhouse_track::{debug, error, info};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Circular pipeline evaluation application")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entities should have logging
    /// level set to `--stdout-level`. Others will have level set to
    /// `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Write log output to this file instead of the console.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Optional TOML file with pipeline sizes (stages, microbatches,
    /// repeats).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of physical pipeline stages.
    #[arg(long)]
    stages: Option<usize>,

    /// Number of microbatches per full pass.
    #[arg(long)]
    microbatches: Option<usize>,

    /// Number of repeats over the physical stages.
    #[arg(long)]
    repeats: Option<usize>,

    /// Rows per microbatch.
    #[arg(long, default_value = "4")]
    rows: usize,

    /// Feature dimension of activations and weights.
    #[arg(long, default_value = "16")]
    features: usize,

    /// Seed for weight and input generation.
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Show a progress bar over loop iterations.
    #[arg(long)]
    progress: bool,
}

/// Layer the pipeline sizes: defaults, TOML file, environment, CLI flags.
fn load_config(args: &Cli) -> Result<PipelineConfig, RunError> {
    let defaults = PipelineConfig {
        stages: 4,
        microbatches: 8,
        repeats: 2,
    };

    let mut figment = Figment::from(Serialized::defaults(defaults));
    if let Some(path) = &args.config {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("SIM_LOOP_"));

    let mut config: PipelineConfig = match figment.extract() {
        Ok(config) => config,
        Err(e) => run_error!(format!("cannot load configuration: {e}")),
    };

    if let Some(stages) = args.stages {
        config.stages = stages;
    }
    if let Some(microbatches) = args.microbatches {
        config.microbatches = microbatches;
    }
    if let Some(repeats) = args.repeats {
        config.repeats = repeats;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), RunError> {
    let args = Cli::parse();
    let tracker = match setup_tracker(
        args.stdout,
        args.stdout_level,
        args.stdout_filter_regex.as_str(),
        args.log_file.as_deref(),
    ) {
        Ok(tracker) => tracker,
        Err(e) => run_error!(format!("cannot set up tracking: {e}")),
    };

    let mut engine = Engine::new(&tracker);
    let top = engine.top().clone();

    let config = load_config(&args)?;
    let total_iterations = config.total_iterations();
    info!(top ;
        "{} stages x {} repeats over {} microbatches of [{} x {}]: {} iterations (seed {})",
        config.stages,
        config.repeats,
        config.microbatches,
        args.rows,
        args.features,
        total_iterations,
        args.seed,
    );

    // The caller works with one global batch; the pipeline sees it as M
    // microbatches and the output is joined back together afterwards.
    let mut rng = StdRng::seed_from_u64(args.seed + 1);
    let batch_rows = config.microbatches * args.rows;
    let batch = Array2::from_shape_fn((batch_rows, args.features), |_| rng.gen_range(-1.0..1.0));
    let inputs = split_batch(&batch, config.microbatches)?;

    let layers = random_weights(config.num_layers(), args.features, args.seed);
    let expected = unrolled(
        &config,
        &WeightStore::from_layers(layers.clone()),
        &dense,
        inputs.clone(),
    )?;

    let scheduler = Scheduler::new(
        engine.top(),
        "scheduler",
        engine.spawner(),
        config.clone(),
        WeightStore::from_layers(layers),
        dense,
        inputs,
    )?;

    let progress_bar = ProgressBar::new(total_iterations as u64);
    if args.progress {
        let event = scheduler.iteration_done();
        let progress_bar = progress_bar.clone();
        engine.spawner().spawn(async move {
            loop {
                let iteration = event.listen().await;
                progress_bar.set_position((iteration + 1) as u64);
                if iteration + 1 == total_iterations {
                    return Ok(());
                }
            }
        });
    }

    {
        let scheduler = scheduler.clone();
        engine.spawn(async move { scheduler.run().await });
    }

    let started = Instant::now();
    let run_result = engine.run();
    let elapsed = started.elapsed();
    if args.progress {
        progress_bar.finish();
    }

    let output = match scheduler.take_output() {
        Some(Ok(output)) => output,
        Some(Err(e)) => {
            error!(top ; "{e}");
            tracker.shutdown();
            return Err(RunError::from(e));
        }
        None => {
            run_result?;
            return run_error!("scheduler did not complete");
        }
    };

    let joined = join_batch(&output)?;
    debug!(top ; "output batch {:?}", joined.dim());

    let max_diff = output
        .iter()
        .zip(expected.iter())
        .flat_map(|(out, exp)| {
            out.data
                .iter()
                .zip(exp.data.iter())
                .map(|(a, b)| (a - b).abs())
        })
        .fold(0.0_f32, f32::max);

    info!(top ; "max |pipeline - unrolled| = {max_diff:.2e}");
    if max_diff > 1e-4 {
        error!(top ; "Fail: pipeline diverges from the unrolled reference");
        tracker.shutdown();
        return run_error!("verification failed");
    }

    let layer_applications = config.microbatches * config.num_layers();
    info!(top ;
        "Pass: {} layer applications in {:.2?} ({:.0} per second)",
        layer_applications,
        elapsed,
        layer_applications as f64 / elapsed.as_secs_f64(),
    );
    tracker.shutdown();
    Ok(())
}
