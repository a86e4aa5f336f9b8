// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Supply Metrics

//! Derived supply aggregates.
//!
//! Each supply is a superset of the previous one:
//! circulating ⊆ user ⊆ earned ⊆ sum of stocks. They are recomputed from the
//! balances every timestep and never cached.

use serde::{Deserialize, Serialize};

use crate::state::State;
use crate::units::Credits;

/// Which supply aggregate prices storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyDefinition {
    Issued,
    Earned,
    EarnedMinusBurned,
    Total,
}

impl SupplyDefinition {
    pub fn credit_supply(self, state: &State) -> Credits {
        match self {
            SupplyDefinition::Issued => issued_supply(state),
            SupplyDefinition::Earned => earned_supply(state),
            SupplyDefinition::EarnedMinusBurned => earned_minus_burned_supply(state),
            SupplyDefinition::Total => total_supply(state),
        }
    }
}

pub fn circulating_supply(state: &State) -> Credits {
    state.operators_balance + state.nominators_balance + state.holders_balance + state.farmers_balance
}

pub fn user_supply(state: &State) -> Credits {
    circulating_supply(state) + state.staking_pool_balance
}

pub fn earned_supply(state: &State) -> Credits {
    user_supply(state) + state.fund_balance
}

pub fn earned_minus_burned_supply(state: &State) -> Credits {
    earned_supply(state) - state.burnt_balance
}

pub fn sum_of_stocks(state: &State) -> Credits {
    earned_supply(state) + state.other_issuance_balance + state.reward_issuance_balance + state.burnt_balance
}

/// Everything released from the farmer reward pool or vested to date.
pub fn issued_supply(state: &State) -> Credits {
    sum_of_stocks(state) - state.reward_issuance_balance - state.burnt_balance
}

/// All tokens still in existence.
pub fn total_supply(state: &State) -> Credits {
    sum_of_stocks(state) - state.burnt_balance
}

/// Storage fees collected per credit of block reward.
pub fn storage_fee_per_rewards(state: &State) -> f64 {
    if state.block_reward > 0.0 {
        state.storage_fee_volume / state.block_reward
    } else {
        0.0
    }
}

/// Write every derived aggregate back into the state.
pub fn refresh_supply_metrics(state: &mut State) {
    state.circulating_supply = circulating_supply(state);
    state.user_supply = user_supply(state);
    state.earned_supply = earned_supply(state);
    state.earned_minus_burned_supply = earned_minus_burned_supply(state);
    state.issued_supply = issued_supply(state);
    state.total_supply = total_supply(state);
    state.sum_of_stocks = sum_of_stocks(state);
    state.storage_fee_per_rewards = storage_fee_per_rewards(state);
}
