// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The four rotating buffers of a circular pipeline run.
//!
//! - `state` starts out holding every not-yet-consumed input microbatch
//!   and progressively fills with completed outputs, indexed by stage and
//!   a rotating microbatch slot.
//! - `shift` holds the single in-flight value per stage, passed from stage
//!   `k` to stage `k+1` between iterations.
//! - `circ_storage` holds the final stage's outputs across a full sweep of
//!   `M` microbatches so they can feed stage 0 on the next repeat. It is
//!   only exercised when `M > S`; with `M == S` the handoff still goes
//!   through it, one full sweep later.
//! - `circ_mover` delays those outputs by one iteration so that the
//!   `circ_storage` write lands exactly `S` iterations after production.
//!
//! All four are allocated once, keep their shape for the whole run, and
//! are consumed once at the end. The payload type is opaque: the buffers
//! rotate values, they never look inside them.

use roundhouse_engine::traits::Payload;

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Scheduler-owned buffer state. See the module documentation.
pub struct BufferSet<T>
where
    T: Payload,
{
    stages: usize,
    slots: usize,
    microbatches: usize,

    /// `[S][M/S]` grid: input microbatches in, completed outputs out.
    state: Vec<Vec<T>>,

    /// `[S]`: stage `k`'s output, rotated to stage `k+1`'s input slot.
    shift: Vec<T>,

    /// `[S][M]`: previous repeat's outputs awaiting reuse by stage 0.
    circ_storage: Vec<Vec<T>>,

    /// `[S]`: one-iteration staging for the `circ_storage` write.
    circ_mover: Vec<T>,
}

impl<T> BufferSet<T>
where
    T: Payload,
{
    /// Allocate the buffers for `config`, filling `state` from `inputs`
    /// (microbatch order) and everything else with the payload default.
    pub fn new(config: &PipelineConfig, inputs: Vec<T>) -> Result<Self, PipelineError> {
        config.validate()?;
        if inputs.len() != config.microbatches {
            return Err(PipelineError::InvalidConfiguration(format!(
                "expected {} input microbatches, got {}",
                config.microbatches,
                inputs.len()
            )));
        }

        let stages = config.stages;
        let slots = config.slots();
        let microbatches = config.microbatches;

        let mut remaining = inputs.into_iter();
        let state = (0..stages)
            .map(|_| remaining.by_ref().take(slots).collect())
            .collect();

        Ok(Self {
            stages,
            slots,
            microbatches,
            state,
            shift: vec![T::default(); stages],
            circ_storage: vec![vec![T::default(); microbatches]; stages],
            circ_mover: vec![T::default(); stages],
        })
    }

    /// The value each stage consumes on `loop_iteration`.
    ///
    /// Stage 0 draws fresh input from `state` during the first sweep and
    /// the prior repeat's stored output from `circ_storage` afterwards;
    /// every other stage takes the rotated previous output from `shift`.
    #[must_use]
    pub fn stage_inputs(&self, loop_iteration: usize) -> Vec<T> {
        let first = if loop_iteration < self.microbatches {
            self.state[0][loop_iteration % self.slots].clone()
        } else {
            self.circ_storage[0][loop_iteration % self.microbatches].clone()
        };

        let mut inputs = Vec::with_capacity(self.stages);
        inputs.push(first);
        inputs.extend(self.shift[1..].iter().cloned());
        inputs
    }

    /// Fold one iteration's stage outputs back into the buffers.
    ///
    /// All reads use pre-update values: `circ_storage` takes the rotated
    /// mover of the previous iteration, not the outputs just produced.
    pub fn advance(&mut self, outputs: Vec<T>, loop_iteration: usize) {
        debug_assert_eq!(outputs.len(), self.stages);
        let slot = loop_iteration % self.slots;

        // One state slot per iteration: retire row 0, pull the remaining
        // rows up one stage, append the final stage's output at the bottom.
        for stage in 0..self.stages - 1 {
            self.state[stage][slot] = self.state[stage + 1][slot].clone();
        }
        self.state[self.stages - 1][slot] = outputs[self.stages - 1].clone();

        // The write index trails production by exactly S iterations; it is
        // the index stage 0 consumes M iterations after the write.
        let offset = (loop_iteration as i64 - self.stages as i64)
            .rem_euclid(self.microbatches as i64) as usize;
        for stage in 0..self.stages {
            self.circ_storage[stage][offset] =
                self.circ_mover[(stage + self.stages - 1) % self.stages].clone();
        }

        self.shift = (0..self.stages)
            .map(|stage| outputs[(stage + self.stages - 1) % self.stages].clone())
            .collect();
        self.circ_mover = outputs;
    }

    /// Consume the buffers, restoring caller microbatch order.
    ///
    /// Each repeated advance leaves a stage's slot row rotated by the
    /// number of iterations spent filling; rotating by
    /// `(S - 1) mod (M/S)` undoes this before flattening `[S][M/S]` back
    /// to `[M]`.
    #[must_use]
    pub fn into_output(self) -> Vec<T> {
        let land = (self.stages - 1) % self.slots;
        let mut output = Vec::with_capacity(self.microbatches);
        for mut row in self.state {
            row.rotate_left(land);
            output.extend(row);
        }
        output
    }

    /// The state grid, indexed `[stage][slot]`.
    #[must_use]
    pub fn state(&self) -> &[Vec<T>] {
        &self.state
    }

    /// The per-stage in-flight values.
    #[must_use]
    pub fn shift(&self) -> &[T] {
        &self.shift
    }

    /// The stored outputs awaiting the next repeat, indexed
    /// `[stage][microbatch]`.
    #[must_use]
    pub fn circ_storage(&self) -> &[Vec<T>] {
        &self.circ_storage
    }

    /// Whether every buffer still has its allocation-time shape. Tests
    /// assert this at each iteration boundary.
    #[must_use]
    pub fn shapes_are_invariant(&self) -> bool {
        self.state.len() == self.stages
            && self.state.iter().all(|row| row.len() == self.slots)
            && self.shift.len() == self.stages
            && self.circ_storage.len() == self.stages
            && self
                .circ_storage
                .iter()
                .all(|row| row.len() == self.microbatches)
            && self.circ_mover.len() == self.stages
    }
}
