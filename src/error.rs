// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Error Types

use crate::conservation::ConservationError;
use crate::state::Field;

/// Invalid parameters handed to a stochastic driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    #[error("normal driver needs a finite non-negative std dev (mean {mean}, std dev {std_dev})")]
    InvalidNormal { mean: f64, std_dev: f64 },

    #[error("poisson driver needs a finite positive mean (got {0})")]
    InvalidPoisson(f64),

    #[error("weekly driver needs a positive period (got {0} days)")]
    InvalidPeriod(f64),
}

/// Everything that can abort a trajectory or a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("block '{block}' produced a non-finite value for {field}: {value}")]
    NonFinite {
        block: String,
        field: Field,
        value: f64,
    },

    #[error(transparent)]
    Conservation(#[from] ConservationError),

    #[error("trajectory (subset {subset}, run {run}) failed at timestep {timestep}: {source}")]
    Trajectory {
        subset: usize,
        run: usize,
        timestep: u64,
        #[source]
        source: Box<EngineError>,
    },

    #[error("parameter {name} = {value} is out of range: {reason}")]
    InvalidParams {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("experiment has no parameter sets to run")]
    EmptySweep,

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl EngineError {
    /// Innermost cause, unwrapping trajectory context.
    pub fn root(&self) -> &EngineError {
        match self {
            EngineError::Trajectory { source, .. } => source.root(),
            other => other,
        }
    }
}
