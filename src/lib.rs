// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin

pub mod units;
pub mod subsidy;
pub mod state;
pub mod error;
pub mod vesting;
pub mod drivers;
pub mod params;
pub mod metrics;
pub mod conservation;
pub mod pipeline;
pub mod blocks;
pub mod simulation;
pub mod table;
pub mod scenarios;
pub mod sweep;
pub mod kpi;
pub mod experiments;

pub use error::{DriverError, EngineError};
pub use params::Params;
pub use pipeline::{Block, Pipeline, Signal, StepContext, UpdateRule};
pub use simulation::{Experiment, Trajectory};
pub use state::{Field, State};
pub use table::{Row, SimulationTable};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// A single interactive trajectory for browser front-ends.
#[wasm_bindgen]
pub struct TwinSimulation {
    params: Params,
    pipeline: Pipeline,
    trajectory: Trajectory,
    seed: u64,
}

impl TwinSimulation {
    pub fn with_params(params: Params, seed: u64) -> Self {
        let trajectory = Trajectory::new(0, 0, params.clone(), State::genesis(), seed);
        Self { params, pipeline: blocks::default_pipeline(), trajectory, seed }
    }

    pub fn step_core(&mut self) -> Result<Row, EngineError> {
        self.trajectory.step(&self.pipeline)?;
        Ok(self.trajectory.row(0, self.pipeline.len()))
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    fn rebuild_pipeline(&mut self, enable: bool, label: &str) {
        let builder = Pipeline::builder().blocks(blocks::default_blocks());
        let builder = if enable { builder.enable(label) } else { builder.disable(label) };
        self.pipeline = builder.build();
    }
}

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl TwinSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self::with_params(Params::default(), seed)
    }

    /// Build from a JSON parameter set.
    pub fn from_json(json: &str, seed: u64) -> Result<TwinSimulation, JsValue> {
        let params = Params::from_json(json).map_err(to_js)?;
        Ok(Self::with_params(params, seed))
    }

    /// Advance one timestep and return the resulting row.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        let row = self.step_core().map_err(to_js)?;
        serde_wasm_bindgen::to_value(&row).map_err(JsValue::from)
    }

    /// Advance `timesteps` without returning intermediate rows.
    pub fn run_batch(&mut self, timesteps: u32) -> Result<(), JsValue> {
        for _ in 0..timesteps {
            self.trajectory.step(&self.pipeline).map_err(to_js)?;
        }
        Ok(())
    }

    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.trajectory.state()).map_err(JsValue::from)
    }

    pub fn timestep(&self) -> u64 {
        self.trajectory.timestep()
    }

    /// Toggle the fund disbursal block.
    pub fn set_fund_rewards(&mut self, enabled: bool) {
        self.rebuild_pipeline(enabled, blocks::FUND_REWARD);
    }

    /// Reset to genesis with the same parameters and seed.
    pub fn reset(&mut self) {
        self.trajectory = Trajectory::new(0, 0, self.params.clone(), State::genesis(), self.seed);
    }
}
