// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Slashing & Staking

//! Staking pool flows.
//!
//! Operator and nominator shares are claims on `staking_pool_balance`. Every
//! deposit or withdrawal is priced at the current credits-per-share so the
//! share price is left unchanged; a slash removes shares in proportion to the
//! credits it takes.

use tracing::debug;

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};
use crate::units::CreditsPerShare;

/// Credits per pool share, or `1` for an empty pool.
pub fn share_price(state: &State) -> CreditsPerShare {
    let shares = state.total_pool_shares();
    if shares > 0.0 {
        state.staking_pool_balance / shares
    } else {
        1.0
    }
}

pub fn p_slash(params: &Params, state: &State, ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let pool = state.staking_pool_balance;
    let mut signal = Signal::new()
        .with(Field::SlashValue, 0.0)
        .with(Field::SlashToFund, 0.0)
        .with(Field::SlashToHolders, 0.0)
        .with(Field::SlashToBurn, 0.0);
    if pool <= 0.0 {
        return Ok(signal);
    }

    let count = ctx.draw(&params.environment.slash_per_day, params, state)?.max(0.0) * state.delta_days;
    let amount = ctx.draw(&params.environment.slash_amount, params, state)?.max(0.0);
    let slash_value = (count * amount).min(pool);
    if slash_value <= 0.0 {
        return Ok(signal);
    }

    let to_fund = slash_value * params.slash_to_fund;
    let to_holders = slash_value * params.slash_to_holders;
    let to_burn = slash_value - to_fund - to_holders;

    // Remove shares so that price = pool / shares is unchanged.
    let shares_removed = state.total_pool_shares() * (slash_value / pool);
    let from_operators = shares_removed.min(state.operator_pool_shares);
    let from_nominators = (shares_removed - from_operators).min(state.nominator_pool_shares);

    signal.insert(Field::SlashValue, slash_value);
    signal.insert(Field::SlashToFund, to_fund);
    signal.insert(Field::SlashToHolders, to_holders);
    signal.insert(Field::SlashToBurn, to_burn);
    signal.insert(Field::StakingPoolBalance, -slash_value);
    signal.insert(Field::FundBalance, to_fund);
    signal.insert(Field::HoldersBalance, to_holders);
    signal.insert(Field::BurntBalance, to_burn);
    signal.insert(Field::OperatorPoolShares, -from_operators);
    signal.insert(Field::NominatorPoolShares, -from_nominators);
    Ok(signal)
}

/// Credits one party moves into (positive) or out of (negative) the pool.
fn stake_delta(fraction: f64, free_balance: f64, shares: f64, price: CreditsPerShare) -> f64 {
    if fraction > 0.0 {
        free_balance.max(0.0) * fraction.min(1.0)
    } else {
        shares * fraction.max(-1.0) * price
    }
}

pub fn p_staking(params: &Params, state: &State, ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let price = share_price(state);
    let operator_fraction = ctx.draw(&params.behavior.operator_stake_per_ts, params, state)?;
    let nominator_fraction = ctx.draw(&params.behavior.nominator_stake_per_ts, params, state)?;

    if price <= 0.0 {
        debug!(shares = state.total_pool_shares(), "staking pool has shares but no balance, skipping");
        return Ok(Signal::new().with(Field::PoolSharePrice, price));
    }

    let pool = state.staking_pool_balance;
    let operator_stake = stake_delta(operator_fraction, state.operators_balance, state.operator_pool_shares, price);
    let nominator_stake = stake_delta(nominator_fraction, state.nominators_balance, state.nominator_pool_shares, price);

    let shares_left = (state.operator_pool_shares
        + share_delta(operator_fraction, operator_stake, state.operator_pool_shares, price))
        + (state.nominator_pool_shares
            + share_delta(nominator_fraction, nominator_stake, state.nominator_pool_shares, price));
    let (operator_stake, nominator_stake, pool_delta) = if state.total_pool_shares() > 0.0 && shares_left <= 0.0 {
        drain_pool(operator_stake, nominator_stake, pool)
    } else {
        clamp_to_pool(operator_stake, nominator_stake, pool)
    };

    // A drained pool retires every share.
    let (operator_shares, nominator_shares) = if pool > 0.0 && pool_delta <= -pool {
        (-state.operator_pool_shares, -state.nominator_pool_shares)
    } else {
        (
            share_delta(operator_fraction, operator_stake, state.operator_pool_shares, price),
            share_delta(nominator_fraction, nominator_stake, state.nominator_pool_shares, price),
        )
    };

    Ok(Signal::new()
        .with(Field::OperatorStake, operator_stake)
        .with(Field::NominatorStake, nominator_stake)
        .with(Field::PoolSharePrice, price)
        .with(Field::OperatorsBalance, -operator_stake)
        .with(Field::NominatorsBalance, -nominator_stake)
        .with(Field::StakingPoolBalance, pool_delta)
        .with(Field::OperatorPoolShares, operator_shares)
        .with(Field::NominatorPoolShares, nominator_shares))
}

/// Shares minted by a deposit or retired by a withdrawal.
fn share_delta(fraction: f64, stake: f64, shares: f64, price: CreditsPerShare) -> f64 {
    if fraction > 0.0 {
        stake / price
    } else {
        shares * fraction.max(-1.0)
    }
}

/// Scale a net withdrawal down to the pool balance.
///
/// Returns the operator and nominator stakes plus the pool delta. Deposits
/// and withdrawals the pool can cover pass through unchanged.
pub fn clamp_to_pool(operator_stake: f64, nominator_stake: f64, pool: f64) -> (f64, f64, f64) {
    let total = operator_stake + nominator_stake;
    if total >= 0.0 || -total < pool {
        return (operator_stake, nominator_stake, total);
    }
    drain_pool(operator_stake, nominator_stake, pool)
}

/// Withdraw exactly `pool`, split in proportion to the requested stakes. The
/// nominator side absorbs the rounding.
fn drain_pool(operator_stake: f64, nominator_stake: f64, pool: f64) -> (f64, f64, f64) {
    let total = operator_stake + nominator_stake;
    if -total > pool {
        debug!(requested = -total, available = pool, "withdrawal scaled to pool balance");
    }
    let scale = if total < 0.0 { -pool / total } else { 0.0 };
    let operator = operator_stake * scale;
    (operator, -pool - operator, -pool)
}
