// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Farmer Rewards

//! Block reward issuance and its distribution.
//!
//! The reward pays a utilisation-discounted proposer part plus a voting part,
//! both derived from the reference subsidy. Issuance stops outright, rather
//! than pro-rating, once the reward pool cannot cover a full payout.

use tracing::debug;

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};
use crate::subsidy::reference_subsidy;

/// Instantaneous reference subsidy, averaged with the previous step's value
/// after the first timestep.
pub fn s_reference_subsidy(params: &Params, state: &State, _: &Signal, ctx: &mut StepContext<'_>) -> Result<f64, EngineError> {
    let current = reference_subsidy(&params.reference_subsidy_components, state.blocks_passed);
    if ctx.timestep > 1 {
        Ok((current + state.reference_subsidy) / 2.0)
    } else {
        Ok(current)
    }
}

/// Reward amounts for one payout, before the issuance balance is checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSplit {
    pub total: f64,
    pub to_proposer: f64,
    pub to_voters: f64,
    pub per_recipient: f64,
}

impl RewardSplit {
    pub const ZERO: RewardSplit = RewardSplit { total: 0.0, to_proposer: 0.0, to_voters: 0.0, per_recipient: 0.0 };

    pub fn compute(params: &Params, state: &State) -> Self {
        let s_r = state.reference_subsidy;
        let f_bar = params.max_block_size * state.storage_fee_in_credits_per_bytes;
        let g = state.block_utilization.clamp(0.0, 1.0);

        let utilization_based_reward = s_r - s_r.min(f_bar) * g;
        let voting_rewards = s_r;
        let total = utilization_based_reward + voting_rewards;

        let per_recipient = voting_rewards / params.reward_recipients.max(1.0);
        let to_proposer = utilization_based_reward + per_recipient;
        Self {
            total,
            to_proposer,
            to_voters: total - to_proposer,
            per_recipient,
        }
    }
}

/// Issue the block reward from the reward pool to farmers.
pub fn p_reward(params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let split = RewardSplit::compute(params, state);
    let paid = if state.reward_issuance_balance > split.total {
        split
    } else {
        if split.total > 0.0 {
            debug!(
                balance = state.reward_issuance_balance,
                requested = split.total,
                "reward pool exhausted, no reward issued"
            );
        }
        RewardSplit::ZERO
    };

    Ok(Signal::new()
        .with(Field::BlockReward, paid.total)
        .with(Field::RewardToProposer, paid.to_proposer)
        .with(Field::RewardToVoters, paid.to_voters)
        .with(Field::PerRecipientReward, paid.per_recipient)
        .with(Field::RewardIssuanceBalance, -paid.total)
        .with(Field::FarmersBalance, paid.total))
}

/// Route the fund's tax on the proposer reward out of the farmers' payout.
pub fn p_split_reward(params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let reward_to_fund = (state.reward_to_proposer * params.fund_tax_on_proposer_reward)
        .min(state.block_reward)
        .max(0.0);
    Ok(Signal::new()
        .with(Field::RewardToFund, reward_to_fund)
        .with(Field::FarmersBalance, -reward_to_fund)
        .with(Field::FundBalance, reward_to_fund))
}

/// Disburse a daily share of the fund to farmers.
pub fn p_fund_reward(_params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let daily = state.dsf_relative_disbursal_per_day.clamp(0.0, 1.0);
    let share = 1.0 - (1.0 - daily).powf(state.delta_days);
    let reward = state.fund_balance.max(0.0) * share;
    Ok(Signal::new()
        .with(Field::FundToFarmers, reward)
        .with(Field::FundBalance, -reward)
        .with(Field::FarmersBalance, reward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsidy::SubsidyComponent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn reward_state() -> State {
        State {
            reference_subsidy: 100.0,
            storage_fee_in_credits_per_bytes: 1e-5,
            block_utilization: 0.5,
            reward_issuance_balance: 1e9,
            ..State::default()
        }
    }

    fn run(policy: crate::pipeline::PolicyFn, params: &Params, state: &State) -> Signal {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = StepContext::new(2, &mut rng);
        policy(params, state, &mut ctx).expect("test: policy")
    }

    #[test]
    fn test_reward_formula() {
        let params = Params::default();
        let state = reward_state();
        let f_bar = params.max_block_size * 1e-5;
        let split = RewardSplit::compute(&params, &state);
        let utilization_based = 100.0 - 100.0_f64.min(f_bar) * 0.5;
        assert!((split.total - (utilization_based + 100.0)).abs() < 1e-9);
        assert!((split.per_recipient - 10.0).abs() < 1e-12);
        assert!((split.to_proposer - (utilization_based + 10.0)).abs() < 1e-9);
        assert!((split.to_voters - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_reward_moves_pool_to_farmers() {
        let signal = run(p_reward, &Params::default(), &reward_state());
        let reward = signal.get_or(Field::BlockReward, 0.0);
        assert!(reward > 0.0);
        assert_eq!(signal.get(Field::RewardIssuanceBalance), Some(-reward));
        assert_eq!(signal.get(Field::FarmersBalance), Some(reward));
    }

    #[test]
    fn test_reward_cliff_pays_nothing() {
        let params = Params::default();
        let mut state = reward_state();
        let total = RewardSplit::compute(&params, &state).total;
        state.reward_issuance_balance = total * 0.999;
        let signal = run(p_reward, &params, &state);
        assert_eq!(signal.get(Field::BlockReward), Some(0.0));
        assert_eq!(signal.get(Field::RewardIssuanceBalance), Some(0.0));
        assert_eq!(signal.get(Field::PerRecipientReward), Some(0.0));

        state.reward_issuance_balance = total;
        assert_eq!(run(p_reward, &params, &state).get(Field::BlockReward), Some(0.0), "equal balance is not enough");
    }

    #[test]
    fn test_split_taxes_proposer_reward() {
        let mut params = Params::default();
        params.fund_tax_on_proposer_reward = 0.1;
        let state = State { block_reward: 200.0, reward_to_proposer: 150.0, ..State::default() };
        let signal = run(p_split_reward, &params, &state);
        assert!((signal.get_or(Field::FundBalance, 0.0) - 15.0).abs() < 1e-12);
        assert!((signal.get_or(Field::FarmersBalance, 0.0) + 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_fund_reward_daily_share() {
        let state = State { fund_balance: 1_000.0, dsf_relative_disbursal_per_day: 0.1, delta_days: 1.0, ..State::default() };
        let signal = run(p_fund_reward, &Params::default(), &state);
        assert!((signal.get_or(Field::FarmersBalance, 0.0) - 100.0).abs() < 1e-9);
        let idle = State { dsf_relative_disbursal_per_day: 0.0, ..state };
        assert_eq!(run(p_fund_reward, &Params::default(), &idle).get(Field::FundBalance), Some(0.0));
    }

    #[test]
    fn test_reference_subsidy_trailing_average() {
        let mut params = Params::default();
        params.reference_subsidy_components = vec![SubsidyComponent::new(0.0, 1e6, 1e9, 4.0)];
        let state = State { reference_subsidy: 2.0, blocks_passed: 10.0, ..State::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut first = StepContext::new(1, &mut rng);
        assert_eq!(s_reference_subsidy(&params, &state, &Signal::new(), &mut first).expect("test: first"), 4.0);
        let mut later = StepContext::new(2, &mut rng);
        assert_eq!(s_reference_subsidy(&params, &state, &Signal::new(), &mut later).expect("test: later"), 3.0);
    }
}
