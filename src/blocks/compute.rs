// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Compute Fees

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};
use crate::units::SHANNON_IN_CREDITS;

/// Second-order approximation of `exp(k·Δ)`, the per-step multiplier update.
pub fn targeted_adjustment(adjustment_variable: f64, target_block_delta: f64) -> f64 {
    let k = adjustment_variable;
    1.0 + k * target_block_delta + k * k * target_block_delta * target_block_delta / 2.0
}

/// Charge holders for compute weight. Bundle weight pays operators, the rest
/// pays farmers.
pub fn p_compute_fees(params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let target_block_delta = params.target_block_fullness - state.block_utilization;
    let adjustment = targeted_adjustment(params.adjustment_variable, target_block_delta);
    let multiplier = state.compute_fee_multiplier * adjustment;

    let tx_weight = state.average_compute_weight_per_tx * state.transaction_count;
    let bundle_weight = state.average_compute_weight_per_bundle * state.bundle_count;
    let total_weight = tx_weight + bundle_weight;

    let priority_fee_volume = state.average_priority_fee;
    let raw_fee = multiplier * params.weight_to_fee * total_weight + priority_fee_volume;
    let fee_volume = raw_fee.max(SHANNON_IN_CREDITS);
    let effective = fee_volume.min(state.holders_balance.max(0.0));

    let bundle_share = bundle_weight / total_weight.max(SHANNON_IN_CREDITS);
    let to_operators = effective * bundle_share;
    let to_farmers = effective - to_operators;

    Ok(Signal::new()
        .with(Field::TargetBlockDelta, target_block_delta)
        .with(Field::TargetedAdjustmentParameter, adjustment)
        .with(Field::ComputeFeeMultiplier, multiplier)
        .with(Field::TxComputeWeight, tx_weight)
        .with(Field::BundleComputeWeight, bundle_weight)
        .with(Field::PriorityFeeVolume, priority_fee_volume)
        .with(Field::ComputeFeeVolume, effective)
        .with(Field::ComputeFeesToFarmers, to_farmers)
        .with(Field::FeesToOperators, to_operators)
        .with(Field::FarmersBalance, to_farmers)
        .with(Field::OperatorsBalance, to_operators)
        .with(Field::HoldersBalance, -effective))
}
