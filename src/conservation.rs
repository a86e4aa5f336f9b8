// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Conservation Monitor

//! Token conservation checks.
//!
//! Blocks only ever move credits between stocks, so the sum of all stocks
//! must equal the genesis issuance at every timestep:
//!
//! ```text
//! sum_of_stocks = earned_supply + other_issuance + reward_issuance + burnt
//! ```
//!
//! Stocks are summed in `Decimal` so the check does not depend on the order
//! in which `f64` balances are added. A violation means a block is broken and
//! aborts the trajectory.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::state::{Field, State, SHARES, STOCKS};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConservationError {
    #[error("supply drifted from genesis: expected {expected}, got {actual}")]
    SupplyDrift { expected: Decimal, actual: Decimal },

    #[error("sum_of_stocks {sum_of_stocks} does not match its components {components}")]
    SupplyIdentity { sum_of_stocks: f64, components: f64 },

    #[error("{field} went negative: {value}")]
    NegativeStock { field: Field, value: f64 },

    #[error("{lower} exceeds {upper}")]
    SupplyOrdering { lower: Field, upper: Field },

    #[error("{field} is not representable as a decimal: {value}")]
    Unrepresentable { field: Field, value: f64 },
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn to_decimal(field: Field, value: f64) -> Result<Decimal, ConservationError> {
    Decimal::from_f64(value).ok_or(ConservationError::Unrepresentable { field, value })
}

pub fn from_decimal(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Exact sum of every conserved stock.
pub fn stock_sum(state: &State) -> Result<Decimal, ConservationError> {
    STOCKS
        .iter()
        .try_fold(Decimal::ZERO, |acc, &field| Ok(acc + to_decimal(field, state.get(field))?))
}

// ---------------------------------------------------------------------------
// Conservation Law
// ---------------------------------------------------------------------------

/// Drift allowed relative to the genesis total.
const RELATIVE_TOLERANCE: Decimal = dec!(0.000000001);

/// Ordered pairs `(lower, upper)` of the supply hierarchy.
const SUPPLY_ORDER: [(Field, Field); 4] = [
    (Field::CirculatingSupply, Field::UserSupply),
    (Field::UserSupply, Field::EarnedSupply),
    (Field::EarnedSupply, Field::SumOfStocks),
    (Field::EarnedMinusBurnedSupply, Field::EarnedSupply),
];

/// Verifies one trajectory against the total it started from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConservationLaw {
    genesis_total: Decimal,
    tolerance: Decimal,
    checks: u64,
}

impl ConservationLaw {
    pub fn new(genesis: &State) -> Result<Self, ConservationError> {
        let genesis_total = stock_sum(genesis)?;
        let tolerance = (genesis_total.abs() * RELATIVE_TOLERANCE).max(dec!(0.000001));
        Ok(Self {
            genesis_total,
            tolerance,
            checks: 0,
        })
    }

    pub fn genesis_total(&self) -> Decimal {
        self.genesis_total
    }

    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// Check non-negativity, conservation, the sum-of-stocks identity and the
    /// supply ordering. The identity and ordering read the metric fields, so
    /// this expects the metrics to have been refreshed for `state`.
    pub fn verify(&mut self, state: &State) -> Result<(), ConservationError> {
        self.checks += 1;
        let slack = from_decimal(self.tolerance);

        for field in STOCKS.iter().chain(SHARES.iter()) {
            let value = state.get(*field);
            if value < -slack {
                return Err(ConservationError::NegativeStock { field: *field, value });
            }
        }

        let actual = stock_sum(state)?;
        if (actual - self.genesis_total).abs() > self.tolerance {
            return Err(ConservationError::SupplyDrift {
                expected: self.genesis_total,
                actual,
            });
        }

        let components = state.earned_supply
            + state.other_issuance_balance
            + state.reward_issuance_balance
            + state.burnt_balance;
        if (state.sum_of_stocks - components).abs() > slack {
            return Err(ConservationError::SupplyIdentity {
                sum_of_stocks: state.sum_of_stocks,
                components,
            });
        }

        for (lower, upper) in SUPPLY_ORDER {
            if state.get(lower) > state.get(upper) + slack {
                return Err(ConservationError::SupplyOrdering { lower, upper });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::refresh_supply_metrics;

    fn funded_state() -> State {
        let mut state = State::genesis();
        state.other_issuance_balance -= 1_000.0;
        state.holders_balance += 600.0;
        state.fund_balance += 400.0;
        refresh_supply_metrics(&mut state);
        state
    }

    #[test]
    fn test_moving_credits_is_conserved() {
        let mut law = ConservationLaw::new(&State::genesis()).expect("test: genesis");
        assert!(law.verify(&funded_state()).is_ok());
        assert_eq!(law.checks(), 1);
    }

    #[test]
    fn test_minting_is_caught() {
        let mut law = ConservationLaw::new(&State::genesis()).expect("test: genesis");
        let mut state = funded_state();
        state.farmers_balance += 10.0;
        refresh_supply_metrics(&mut state);
        assert!(matches!(law.verify(&state), Err(ConservationError::SupplyDrift { .. })));
    }

    #[test]
    fn test_negative_balance_is_caught() {
        let mut law = ConservationLaw::new(&State::genesis()).expect("test: genesis");
        let mut state = funded_state();
        state.holders_balance = -50.0;
        state.farmers_balance += 650.0;
        refresh_supply_metrics(&mut state);
        let err = law.verify(&state).expect_err("test: negative holders");
        assert_eq!(err, ConservationError::NegativeStock { field: Field::HoldersBalance, value: -50.0 });
    }

    #[test]
    fn test_stale_identity_is_caught() {
        let mut law = ConservationLaw::new(&State::genesis()).expect("test: genesis");
        let mut state = funded_state();
        state.sum_of_stocks += 1_000.0;
        assert!(matches!(law.verify(&state), Err(ConservationError::SupplyIdentity { .. })));
    }

    #[test]
    fn test_decimal_sum_matches_genesis_issuance() {
        let total = stock_sum(&State::genesis()).expect("test: sum");
        assert!((from_decimal(total) - crate::units::MAX_CREDIT_ISSUANCE).abs() < 1e-3);
    }
}
