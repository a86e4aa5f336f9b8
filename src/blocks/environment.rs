// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Environmental Processes

//! Network activity observables, redrawn every timestep from their drivers
//! and floored at the configured minimums.

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};

pub fn s_average_base_fee(params: &Params, state: &State, _: &Signal, ctx: &mut StepContext<'_>) -> Result<f64, EngineError> {
    Ok(ctx.draw(&params.environment.base_fee, params, state)?.max(params.min_base_fee))
}

pub fn s_average_priority_fee(params: &Params, state: &State, _: &Signal, ctx: &mut StepContext<'_>) -> Result<f64, EngineError> {
    Ok(ctx.draw(&params.environment.priority_fee, params, state)?.max(0.0))
}

pub fn s_average_compute_weight_per_tx(
    params: &Params,
    state: &State,
    _: &Signal,
    ctx: &mut StepContext<'_>,
) -> Result<f64, EngineError> {
    let draw = ctx.draw(&params.environment.compute_weights_per_tx, params, state)?;
    Ok(draw.max(params.min_compute_weights_per_tx))
}

pub fn s_average_compute_weight_per_bundle(
    params: &Params,
    state: &State,
    _: &Signal,
    ctx: &mut StepContext<'_>,
) -> Result<f64, EngineError> {
    let draw = ctx.draw(&params.environment.compute_weights_per_bundle, params, state)?;
    Ok(draw.max(params.min_compute_weights_per_bundle))
}

pub fn s_average_transaction_size(
    params: &Params,
    state: &State,
    _: &Signal,
    ctx: &mut StepContext<'_>,
) -> Result<f64, EngineError> {
    Ok(ctx.draw(&params.environment.transaction_size, params, state)?.max(params.min_transaction_size))
}

pub fn s_average_bundle_size(params: &Params, state: &State, _: &Signal, ctx: &mut StepContext<'_>) -> Result<f64, EngineError> {
    Ok(ctx.draw(&params.environment.bundle_size, params, state)?.max(params.min_bundle_size))
}

pub fn s_bundle_count(params: &Params, state: &State, _: &Signal, ctx: &mut StepContext<'_>) -> Result<f64, EngineError> {
    let per_day = ctx.draw(&params.environment.bundle_count_per_day, params, state)?.max(0.0);
    Ok(per_day * state.delta_days)
}

/// Transactions included this step and the share of block space they fill.
pub fn p_block_utilization(params: &Params, state: &State, ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let per_day = ctx.draw(&params.environment.transaction_count_per_day, params, state)?.max(0.0);
    let tx_size = state.average_transaction_size.max(1.0);
    let capacity = params.max_block_size * state.delta_blocks;

    let (transaction_count, block_utilization) = if capacity > 0.0 {
        let count = (per_day * state.delta_days).min(capacity / tx_size);
        (count, count * tx_size / capacity)
    } else {
        (0.0, 0.0)
    };

    Ok(Signal::new()
        .with(Field::TransactionCount, transaction_count)
        .with(Field::BlockUtilization, block_utilization))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::Driver;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn day_state() -> State {
        State { delta_days: 1.0, delta_blocks: 14_400.0, average_transaction_size: 256.0, ..State::default() }
    }

    #[test]
    fn test_draws_are_floored_at_minimums() {
        let mut params = Params::default();
        params.environment.compute_weights_per_tx = Driver::constant(1.0);
        params.environment.transaction_size = Driver::constant(-5.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = StepContext::new(1, &mut rng);
        let state = day_state();
        let cw = s_average_compute_weight_per_tx(&params, &state, &Signal::new(), &mut ctx).expect("test: cw");
        let size = s_average_transaction_size(&params, &state, &Signal::new(), &mut ctx).expect("test: size");
        assert_eq!(cw, params.min_compute_weights_per_tx);
        assert_eq!(size, params.min_transaction_size);
    }

    #[test]
    fn test_constant_utilization_fills_half_the_blocks() {
        let params = Params::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = StepContext::new(1, &mut rng);
        let signal = p_block_utilization(&params, &day_state(), &mut ctx).expect("test: utilization");
        let utilization = signal.get(Field::BlockUtilization).expect("test: key");
        assert!((utilization - 0.5).abs() < 1e-9, "got {}", utilization);
    }

    #[test]
    fn test_utilization_saturates_at_capacity() {
        let mut params = Params::default();
        params.environment.transaction_count_per_day = Driver::constant(1e15);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = StepContext::new(1, &mut rng);
        let signal = p_block_utilization(&params, &day_state(), &mut ctx).expect("test: utilization");
        assert!((signal.get_or(Field::BlockUtilization, 0.0) - 1.0).abs() < 1e-12);
    }
}
