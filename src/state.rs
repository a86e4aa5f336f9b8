// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Simulation State

//! The per-trajectory state record.
//!
//! [`State`] holds every quantity the pipeline reads or writes. Each field has
//! a matching [`Field`] variant so signals and update rules can address it
//! without string keys; the serde name of a variant equals the struct field
//! name, which is also the column name in the output table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::{ISSUANCE_FOR_FARMERS, OTHER_ISSUANCE};

macro_rules! state_schema {
    ($( $(#[$meta:meta])* $variant:ident => $field:ident ),* $(,)?) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct State {
            $( $(#[$meta])* pub $field: f64, )*
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Field {
            $( $variant, )*
        }

        impl Field {
            pub const ALL: &'static [Field] = &[ $( Field::$variant, )* ];

            pub fn name(self) -> &'static str {
                match self {
                    $( Field::$variant => stringify!($field), )*
                }
            }

            pub fn from_name(name: &str) -> Option<Field> {
                match name {
                    $( stringify!($field) => Some(Field::$variant), )*
                    _ => None,
                }
            }
        }

        impl State {
            pub fn get(&self, field: Field) -> f64 {
                match field {
                    $( Field::$variant => self.$field, )*
                }
            }

            pub fn set(&mut self, field: Field, value: f64) {
                match field {
                    $( Field::$variant => self.$field = value, )*
                }
            }
        }
    };
}

state_schema! {
    // ─── Time ───
    DaysPassed => days_passed,
    BlocksPassed => blocks_passed,
    DeltaDays => delta_days,
    DeltaBlocks => delta_blocks,

    // ─── Supply metrics ───
    CirculatingSupply => circulating_supply,
    UserSupply => user_supply,
    EarnedSupply => earned_supply,
    IssuedSupply => issued_supply,
    EarnedMinusBurnedSupply => earned_minus_burned_supply,
    TotalSupply => total_supply,
    SumOfStocks => sum_of_stocks,
    StorageFeePerRewards => storage_fee_per_rewards,
    BlockUtilization => block_utilization,

    // ─── Governance ───
    /// Fraction of the fund paid out to farmers per day.
    DsfRelativeDisbursalPerDay => dsf_relative_disbursal_per_day,

    // ─── Stocks ───
    RewardIssuanceBalance => reward_issuance_balance,
    OtherIssuanceBalance => other_issuance_balance,
    OperatorsBalance => operators_balance,
    NominatorsBalance => nominators_balance,
    HoldersBalance => holders_balance,
    FarmersBalance => farmers_balance,
    StakingPoolBalance => staking_pool_balance,
    FundBalance => fund_balance,
    BurntBalance => burnt_balance,

    // ─── Staking pool shares ───
    NominatorPoolShares => nominator_pool_shares,
    OperatorPoolShares => operator_pool_shares,
    PoolSharePrice => pool_share_price,
    OperatorStake => operator_stake,
    NominatorStake => nominator_stake,

    // ─── Rewards ───
    ReferenceSubsidy => reference_subsidy,
    BlockReward => block_reward,
    RewardToProposer => reward_to_proposer,
    RewardToVoters => reward_to_voters,
    PerRecipientReward => per_recipient_reward,
    RewardToFund => reward_to_fund,
    FundToFarmers => fund_to_farmers,

    // ─── Archival & storage ───
    BlockchainHistorySize => blockchain_history_size,
    TotalSpacePledged => total_space_pledged,
    NewlyPledgedSpace => newly_pledged_space,
    BufferSize => buffer_size,

    // ─── Vesting ───
    AllocatedTokens => allocated_tokens,
    AllocatedTokensInvestors => allocated_tokens_investors,
    AllocatedTokensFounders => allocated_tokens_founders,
    AllocatedTokensTeam => allocated_tokens_team,
    AllocatedTokensAdvisors => allocated_tokens_advisors,
    AllocatedTokensVendors => allocated_tokens_vendors,
    AllocatedTokensAmbassadors => allocated_tokens_ambassadors,
    AllocatedTokensTestnets => allocated_tokens_testnets,
    AllocatedTokensFoundation => allocated_tokens_foundation,
    AllocatedTokensSubspaceLabs => allocated_tokens_subspace_labs,
    AllocatedTokensSslPrivSale => allocated_tokens_ssl_priv_sale,

    // ─── Environmental observables ───
    AverageBaseFee => average_base_fee,
    AveragePriorityFee => average_priority_fee,
    AverageComputeWeightPerTx => average_compute_weight_per_tx,
    AverageTransactionSize => average_transaction_size,
    TransactionCount => transaction_count,
    AverageComputeWeightPerBundle => average_compute_weight_per_bundle,
    AverageBundleSize => average_bundle_size,
    BundleCount => bundle_count,

    // ─── Storage fees ───
    FreeSpace => free_space,
    StorageFeeInCreditsPerBytes => storage_fee_in_credits_per_bytes,
    ExtrinsicLengthInBytes => extrinsic_length_in_bytes,
    StorageFeeVolume => storage_fee_volume,
    StorageFeesToFarmers => storage_fees_to_farmers,
    StorageFeesToFund => storage_fees_to_fund,

    // ─── Compute fees ───
    ComputeFeeMultiplier => compute_fee_multiplier,
    TargetBlockDelta => target_block_delta,
    TargetedAdjustmentParameter => targeted_adjustment_parameter,
    TxComputeWeight => tx_compute_weight,
    BundleComputeWeight => bundle_compute_weight,
    PriorityFeeVolume => priority_fee_volume,
    ComputeFeeVolume => compute_fee_volume,
    ComputeFeesToFarmers => compute_fees_to_farmers,
    FeesToOperators => fees_to_operators,

    // ─── Slashing ───
    SlashValue => slash_value,
    SlashToFund => slash_to_fund,
    SlashToHolders => slash_to_holders,
    SlashToBurn => slash_to_burn,

    // ─── Running accumulators ───
    CummRewards => cumm_rewards,
    CummStorageFeesToFarmers => cumm_storage_fees_to_farmers,
    CummComputeFeesToFarmers => cumm_compute_fees_to_farmers,
}

/// Token stocks whose sum is conserved.
pub const STOCKS: [Field; 9] = [
    Field::RewardIssuanceBalance,
    Field::OtherIssuanceBalance,
    Field::OperatorsBalance,
    Field::NominatorsBalance,
    Field::HoldersBalance,
    Field::FarmersBalance,
    Field::StakingPoolBalance,
    Field::FundBalance,
    Field::BurntBalance,
];

pub const SHARES: [Field; 2] = [Field::OperatorPoolShares, Field::NominatorPoolShares];

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl State {
    /// Genesis snapshot: every balance empty except the two issuance pools.
    pub fn genesis() -> Self {
        let mut state = Self {
            reward_issuance_balance: ISSUANCE_FOR_FARMERS,
            other_issuance_balance: OTHER_ISSUANCE,
            compute_fee_multiplier: 1.0,
            pool_share_price: 1.0,
            average_transaction_size: 256.0,
            ..Self::default()
        };
        crate::metrics::refresh_supply_metrics(&mut state);
        state
    }

    pub fn stock_total(&self) -> f64 {
        STOCKS.iter().map(|&f| self.get(f)).sum()
    }

    pub fn total_pool_shares(&self) -> f64 {
        self.operator_pool_shares + self.nominator_pool_shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::MAX_CREDIT_ISSUANCE;

    #[test]
    fn test_field_names_match_serialized_columns() {
        let state = State::genesis();
        let json = serde_json::to_value(&state).expect("test: serialize");
        let object = json.as_object().expect("test: object");
        assert_eq!(object.len(), Field::ALL.len());
        for field in Field::ALL {
            assert!(object.contains_key(field.name()), "missing column {}", field);
            let as_json = serde_json::to_value(field).expect("test: serialize field");
            assert_eq!(as_json, serde_json::Value::String(field.name().to_string()));
        }
    }

    #[test]
    fn test_get_set_roundtrip_by_field() {
        let mut state = State::default();
        state.set(Field::HoldersBalance, 42.0);
        assert_eq!(state.holders_balance, 42.0);
        assert_eq!(state.get(Field::HoldersBalance), 42.0);
        assert_eq!(Field::from_name("holders_balance"), Some(Field::HoldersBalance));
        assert_eq!(Field::from_name("no_such_column"), None);
    }

    #[test]
    fn test_genesis_holds_entire_issuance() {
        let state = State::genesis();
        assert!((state.stock_total() - MAX_CREDIT_ISSUANCE).abs() < 1e-3);
        assert!((state.sum_of_stocks - MAX_CREDIT_ISSUANCE).abs() < 1e-3);
        assert_eq!(state.circulating_supply, 0.0);
        assert_eq!(state.compute_fee_multiplier, 1.0);
    }
}
