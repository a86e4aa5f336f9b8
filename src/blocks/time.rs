// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Time Tracking

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};
use crate::units::DAY_TO_SECONDS;

/// Advance the clock by one timestep.
pub fn p_evolve_time(params: &Params, _state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let delta_days = params.timestep_in_days;
    let delta_blocks = delta_days * DAY_TO_SECONDS / params.block_time_in_seconds;
    Ok(Signal::new()
        .with(Field::DeltaDays, delta_days)
        .with(Field::DaysPassed, delta_days)
        .with(Field::DeltaBlocks, delta_blocks)
        .with(Field::BlocksPassed, delta_blocks))
}
