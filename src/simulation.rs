// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Simulation Runner

//! Drives the pipeline across sweep × sample × timestep.
//!
//! Each trajectory owns its state and a `ChaCha8Rng` seeded from
//! `base_seed + subset * samples + run`, so results do not depend on how
//! trajectories are scheduled across threads.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::blocks;
use crate::conservation::ConservationLaw;
use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Pipeline, StepContext};
use crate::state::State;
use crate::table::{Row, SimulationTable};

// ─── Trajectory ──────────────────────────────────────────────────────────────

/// One (sweep point, sample) pair advanced timestep by timestep.
#[derive(Debug, Clone)]
pub struct Trajectory {
    subset: usize,
    run: usize,
    params: Params,
    state: State,
    rng: ChaCha8Rng,
    timestep: u64,
    monitor: Option<ConservationLaw>,
}

impl Trajectory {
    pub fn new(subset: usize, run: usize, params: Params, initial: State, seed: u64) -> Self {
        Self {
            subset,
            run,
            params,
            state: initial,
            rng: ChaCha8Rng::seed_from_u64(seed),
            timestep: 0,
            monitor: None,
        }
    }

    /// Verify conservation, non-negativity and supply ordering after every
    /// step. The pipeline must refresh the supply metrics for the ordering
    /// checks to be meaningful.
    pub fn with_conservation_check(mut self) -> Result<Self, EngineError> {
        self.monitor = Some(ConservationLaw::new(&self.state)?);
        Ok(self)
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    pub fn step(&mut self, pipeline: &Pipeline) -> Result<&State, EngineError> {
        self.timestep += 1;
        let mut ctx = StepContext::new(self.timestep, &mut self.rng);
        let mut outcome = pipeline.step(&self.params, &mut self.state, &mut ctx);
        if outcome.is_ok() {
            if let Some(law) = self.monitor.as_mut() {
                outcome = law.verify(&self.state).map_err(EngineError::from);
            }
        }

        match outcome {
            Ok(()) => Ok(&self.state),
            Err(source) => {
                warn!(
                    subset = self.subset,
                    run = self.run,
                    timestep = self.timestep,
                    error = %source,
                    "trajectory aborted"
                );
                Err(EngineError::Trajectory {
                    subset: self.subset,
                    run: self.run,
                    timestep: self.timestep,
                    source: Box::new(source),
                })
            }
        }
    }

    pub fn row(&self, simulation: usize, substep: usize) -> Row {
        Row {
            simulation,
            subset: self.subset,
            run: self.run,
            timestep: self.timestep,
            substep,
            label: self.params.label.clone(),
            environmental_label: self.params.environmental_label.clone(),
            state: self.state.clone(),
        }
    }
}

// ─── Experiment ──────────────────────────────────────────────────────────────

/// A full run definition: initial state, sweep, pipeline and dimensions.
#[derive(Debug, Clone)]
pub struct Experiment {
    pub simulation: usize,
    pub initial_state: State,
    pub sweep: Vec<Params>,
    pub pipeline: Pipeline,
    pub timesteps: u64,
    pub samples: usize,
    pub base_seed: u64,
    pub check_invariants: bool,
}

impl Experiment {
    /// Genesis state, default pipeline, one sample, no timesteps.
    pub fn new(sweep: Vec<Params>) -> Self {
        Self {
            simulation: 0,
            initial_state: State::genesis(),
            sweep,
            pipeline: blocks::default_pipeline(),
            timesteps: 0,
            samples: 1,
            base_seed: 0,
            check_invariants: false,
        }
    }

    pub fn single(params: Params) -> Self {
        Self::new(vec![params])
    }

    pub fn with_timesteps(mut self, timesteps: u64) -> Self {
        self.timesteps = timesteps;
        self
    }

    /// Timesteps covering `days` at the first sweep point's step length.
    pub fn with_days(self, days: f64) -> Self {
        let step = self.sweep.first().map(|p| p.timestep_in_days).unwrap_or(1.0);
        let timesteps = if step > 0.0 { (days / step).floor() as u64 } else { 0 };
        self.with_timesteps(timesteps)
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_initial_state(mut self, state: State) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    pub fn trajectory_count(&self) -> usize {
        self.sweep.len() * self.samples
    }

    /// Rows the run will produce: the initial row plus one per timestep.
    pub fn measurement_count(&self) -> usize {
        self.trajectory_count() * (self.timesteps as usize + 1)
    }

    pub fn seed_for(&self, subset: usize, run: usize) -> u64 {
        self.base_seed.wrapping_add((subset * self.samples + run) as u64)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.sweep.is_empty() || self.samples == 0 {
            return Err(EngineError::EmptySweep);
        }
        for params in &self.sweep {
            params.validate()?;
        }
        Ok(())
    }

    fn log_start(&self) {
        info!(
            sweeps = self.sweep.len(),
            samples = self.samples,
            timesteps = self.timesteps,
            trajectories = self.trajectory_count(),
            measurements = self.measurement_count(),
            blocks = self.pipeline.len(),
            "experiment started"
        );
    }

    fn log_finish(&self, stopwatch: &Stopwatch) {
        let measurements = self.measurement_count();
        match stopwatch.elapsed_secs() {
            Some(secs) => info!(
                measurements,
                duration_secs = secs,
                measurements_per_sec = measurements as f64 / secs.max(f64::EPSILON),
                "experiment finished"
            ),
            None => info!(measurements, "experiment finished"),
        }
    }

    /// Run a single trajectory to completion.
    pub fn run_trajectory(&self, subset: usize, run: usize) -> Result<Vec<Row>, EngineError> {
        let params = self.sweep.get(subset).ok_or(EngineError::EmptySweep)?;
        let mut trajectory = Trajectory::new(
            subset,
            run,
            params.clone(),
            self.initial_state.clone(),
            self.seed_for(subset, run),
        );
        if self.check_invariants {
            trajectory = trajectory.with_conservation_check()?;
        }

        let substep = self.pipeline.len();
        let mut rows = Vec::with_capacity(self.timesteps as usize + 1);
        rows.push(trajectory.row(self.simulation, 0));
        for _ in 0..self.timesteps {
            trajectory.step(&self.pipeline)?;
            rows.push(trajectory.row(self.simulation, substep));
        }

        debug!(subset, run, rows = rows.len(), "trajectory finished");
        Ok(rows)
    }

    fn run_subsets(&self, subsets: &[usize]) -> Result<Vec<Row>, EngineError> {
        let mut rows = Vec::with_capacity(subsets.len() * self.samples * (self.timesteps as usize + 1));
        for &subset in subsets {
            for run in 0..self.samples {
                rows.extend(self.run_trajectory(subset, run)?);
            }
        }
        Ok(rows)
    }

    /// Every trajectory on the calling thread, in (subset, run) order.
    pub fn run(&self) -> Result<SimulationTable, EngineError> {
        self.validate()?;
        self.log_start();
        let stopwatch = Stopwatch::start();

        let subsets: Vec<usize> = (0..self.sweep.len()).collect();
        let table = SimulationTable::from_rows(self.run_subsets(&subsets)?);

        self.log_finish(&stopwatch);
        Ok(table)
    }

    /// Split the sweep into chunks of `chunk_size` sweep points and run the
    /// chunks on the rayon pool. The first failing chunk fails the run.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_parallel(&self, chunk_size: usize) -> Result<SimulationTable, EngineError> {
        use rayon::prelude::*;

        self.validate()?;
        self.log_start();
        let stopwatch = Stopwatch::start();

        let subsets: Vec<usize> = (0..self.sweep.len()).collect();
        let chunks: Vec<&[usize]> = subsets.chunks(chunk_size.max(1)).collect();
        let shards = chunks
            .into_par_iter()
            .enumerate()
            .map(|(chunk, subsets)| {
                debug!(chunk, sweeps = subsets.len(), "chunk dispatched");
                self.run_subsets(subsets)
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let table = SimulationTable::from_rows(shards.into_iter().flatten().collect());
        self.log_finish(&stopwatch);
        Ok(table)
    }
}

// ─── Timing ──────────────────────────────────────────────────────────────────

/// Wall-clock timer; `std::time::Instant` is unavailable in the browser.
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    started: std::time::Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            started: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed_secs(&self) -> Option<f64> {
        Some(self.started.elapsed().as_secs_f64())
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed_secs(&self) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::Driver;
    use crate::pipeline::Block;
    use crate::state::Field;

    fn short(params: Params) -> Experiment {
        Experiment::single(params).with_timesteps(5)
    }

    #[test]
    fn test_rows_cover_initial_and_every_step() {
        let experiment = short(Params::default()).with_samples(2);
        let table = experiment.run().expect("test: run");
        assert_eq!(table.len(), 2 * 6);
        let first: Vec<&Row> = table.trajectory(0, 0).collect();
        assert_eq!(first[0].timestep, 0);
        assert_eq!(first[0].substep, 0);
        assert_eq!(first[5].timestep, 5);
        assert_eq!(first[5].substep, experiment.pipeline.len());
        assert_eq!(first[5].state.days_passed, 5.0);
    }

    #[test]
    fn test_seeds_are_distinct_per_trajectory() {
        let experiment = Experiment::new(vec![Params::default(), Params::default()]).with_samples(3).with_seed(100);
        assert_eq!(experiment.seed_for(0, 0), 100);
        assert_eq!(experiment.seed_for(0, 2), 102);
        assert_eq!(experiment.seed_for(1, 0), 103);
    }

    #[test]
    fn test_empty_sweep_is_rejected() {
        assert!(matches!(Experiment::new(Vec::new()).run(), Err(EngineError::EmptySweep)));
        assert!(matches!(short(Params::default()).with_samples(0).run(), Err(EngineError::EmptySweep)));
    }

    #[test]
    fn test_invalid_params_rejected_before_running() {
        let mut params = Params::default();
        params.min_replication_factor = 0.0;
        let err = short(params).run().expect_err("test: must fail");
        assert!(matches!(err, EngineError::InvalidParams { name: "min_replication_factor", .. }), "{err}");
    }

    #[test]
    fn test_driver_error_aborts_with_context() {
        let mut params = Params::default();
        params.environment.new_sectors_per_day = Driver::normal(1_000.0, -1.0);
        let err = short(params).run().expect_err("test: must fail");
        match &err {
            EngineError::Trajectory { subset, run, timestep, .. } => {
                assert_eq!((*subset, *run, *timestep), (0, 0, 1));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(err.root(), EngineError::Driver(_)));
    }

    fn mint(_: &Params, _: &State, _: &mut StepContext<'_>) -> Result<crate::pipeline::Signal, EngineError> {
        Ok(crate::pipeline::Signal::new().with(Field::HoldersBalance, 1_000.0))
    }

    #[test]
    fn test_conservation_monitor_catches_minting() {
        let pipeline = Pipeline::builder()
            .blocks(blocks::default_blocks())
            .block(Block::new("Mint").policy("mint", mint).accumulate(&[Field::HoldersBalance]))
            .build();
        let experiment = short(Params::default()).with_pipeline(pipeline).with_invariant_checks(true);
        let err = experiment.run().expect_err("test: must fail");
        assert!(matches!(err.root(), EngineError::Conservation(_)), "{err}");
    }

    #[test]
    fn test_trajectory_steps_manually() {
        let pipeline = blocks::default_pipeline();
        let mut trajectory = Trajectory::new(0, 0, Params::default(), State::genesis(), 42)
            .with_conservation_check()
            .expect("test: monitor");
        for _ in 0..3 {
            trajectory.step(&pipeline).expect("test: step");
        }
        assert_eq!(trajectory.timestep(), 3);
        assert_eq!(trajectory.state().days_passed, 3.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_parallel_matches_sequential() {
        let sweep = vec![Params::default(), Params::default().with_label("b"), Params::default().with_label("c")];
        let experiment = Experiment::new(sweep).with_timesteps(4).with_samples(2).with_seed(9);
        let sequential = experiment.run().expect("test: sequential");
        let parallel = experiment.run_parallel(1).expect("test: parallel");
        assert_eq!(sequential, parallel);
    }
}
