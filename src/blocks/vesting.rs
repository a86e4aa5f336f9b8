// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Unvesting

use crate::error::EngineError;
use crate::params::Params;
use crate::pipeline::{Signal, StepContext};
use crate::state::{Field, State};

/// Release newly vested tokens from other issuance to holders.
///
/// `allocated_tokens` never decreases and never releases more than
/// `other_issuance_balance` still holds.
pub fn p_unvest(params: &Params, state: &State, _ctx: &mut StepContext<'_>) -> Result<Signal, EngineError> {
    let mut signal = Signal::new();
    let mut scheduled = 0.0;
    for tranche in &params.vesting.tranches {
        let field = tranche.cohort.field();
        let allocation = tranche.allocation(state.days_passed).max(state.get(field));
        scheduled += allocation;
        signal.insert(field, allocation);
    }

    let released = (scheduled - state.allocated_tokens).clamp(0.0, state.other_issuance_balance.max(0.0));
    Ok(signal
        .with(Field::AllocatedTokens, state.allocated_tokens + released)
        .with(Field::HoldersBalance, released)
        .with(Field::OtherIssuanceBalance, -released))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vesting::{Cohort, VestingSchedule, VestingTranche};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(params: &Params, state: &State) -> Signal {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = StepContext::new(1, &mut rng);
        p_unvest(params, state, &mut ctx).expect("test: unvest")
    }

    #[test]
    fn test_liquid_cohorts_release_on_first_step() {
        let params = Params::default();
        let state = State::genesis();
        let signal = run(&params, &state);
        let released = signal.get_or(Field::HoldersBalance, 0.0);
        let liquid = params.vesting.allocated_tokens(0.0);
        assert!(released > 0.0);
        assert!((released - liquid).abs() < 1e-3);
        assert_eq!(signal.get(Field::AllocatedTokensInvestors), Some(0.0));
    }

    #[test]
    fn test_only_the_increment_is_released() {
        let params = Params::default();
        let mut state = State::genesis();
        state.days_passed = 365.0;
        state.allocated_tokens = params.vesting.allocated_tokens(364.0);
        let signal = run(&params, &state);
        let expected = params.vesting.allocated_tokens(365.0) - params.vesting.allocated_tokens(364.0);
        assert!((signal.get_or(Field::HoldersBalance, 0.0) - expected).abs() < 1e-3);
        assert!(expected > 0.0, "cliff releases a quarter of the locked cohorts");
    }

    #[test]
    fn test_release_bounded_by_other_issuance() {
        let mut params = Params::default();
        params.vesting = VestingSchedule { tranches: vec![VestingTranche::liquid(Cohort::Foundation, 0.5)] };
        let state = State { other_issuance_balance: 10.0, ..State::default() };
        let signal = run(&params, &state);
        assert_eq!(signal.get(Field::HoldersBalance), Some(10.0));
        assert_eq!(signal.get(Field::AllocatedTokens), Some(10.0));
    }
}
