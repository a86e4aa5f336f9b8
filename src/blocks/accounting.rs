// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Accounting

use crate::error::EngineError;
use crate::metrics;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};

/// Derived supply aggregates over the balances committed so far this step.
pub fn p_supply_metrics(_params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    Ok(Signal::new()
        .with(Field::CirculatingSupply, metrics::circulating_supply(state))
        .with(Field::UserSupply, metrics::user_supply(state))
        .with(Field::EarnedSupply, metrics::earned_supply(state))
        .with(Field::EarnedMinusBurnedSupply, metrics::earned_minus_burned_supply(state))
        .with(Field::IssuedSupply, metrics::issued_supply(state))
        .with(Field::TotalSupply, metrics::total_supply(state))
        .with(Field::SumOfStocks, metrics::sum_of_stocks(state))
        .with(Field::StorageFeePerRewards, metrics::storage_fee_per_rewards(state)))
}

/// Per-step increments of the running totals.
pub fn p_accumulators(_params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    Ok(Signal::new()
        .with(Field::CummRewards, state.block_reward)
        .with(Field::CummStorageFeesToFarmers, state.storage_fees_to_farmers)
        .with(Field::CummComputeFeesToFarmers, state.compute_fees_to_farmers))
}
