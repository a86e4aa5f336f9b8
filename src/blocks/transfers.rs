// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Transfers

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};

/// Participants move a share of their free balance every timestep:
/// farmers and operators sell to holders, holders buy into nominator and
/// operator positions.
pub fn p_transfers(params: &Params, state: &State, ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let behavior = &params.behavior;
    let mut delta_farmers = 0.0;
    let mut delta_operators = 0.0;
    let mut delta_holders = 0.0;
    let mut delta_nominators = 0.0;

    if state.farmers_balance > 0.0 {
        let share = ctx.draw(&behavior.transfer_farmer_to_holder_per_day, params, state)?.clamp(0.0, 1.0);
        let amount = state.farmers_balance * share;
        delta_farmers -= amount;
        delta_holders += amount;
    }

    if state.operators_balance > 0.0 {
        let share = ctx.draw(&behavior.transfer_operator_to_holder_per_day, params, state)?.clamp(0.0, 1.0);
        let amount = state.operators_balance * share;
        delta_operators -= amount;
        delta_holders += amount;
    }

    if state.holders_balance > 0.0 {
        let mut to_nominators = ctx.draw(&behavior.transfer_holder_to_nominator_per_day, params, state)?.clamp(0.0, 1.0);
        let mut to_operators = ctx.draw(&behavior.transfer_holder_to_operator_per_day, params, state)?.clamp(0.0, 1.0);
        let outflow = to_nominators + to_operators;
        if outflow > 1.0 {
            to_nominators /= outflow;
            to_operators /= outflow;
        }
        let amount_nominators = state.holders_balance * to_nominators;
        let amount_operators = state.holders_balance * to_operators;
        delta_holders -= amount_nominators + amount_operators;
        delta_nominators += amount_nominators;
        delta_operators += amount_operators;
    }

    Ok(Signal::new()
        .with(Field::FarmersBalance, delta_farmers)
        .with(Field::OperatorsBalance, delta_operators)
        .with(Field::HoldersBalance, delta_holders)
        .with(Field::NominatorsBalance, delta_nominators))
}
