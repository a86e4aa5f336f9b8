// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Default Block Set

//! The economy's default transition, one [`Block`] per process.
//!
//! Order matters: fee markets price against the utilisation drawn earlier in
//! the same step, rewards read this step's storage price, and the supply
//! metrics run last so they describe the committed balances.

pub mod accounting;
pub mod compute;
pub mod environment;
pub mod rewards;
pub mod staking;
pub mod storage;
pub mod time;
pub mod transfers;
pub mod vesting;

use crate::pipeline::{Block, Pipeline};
use crate::state::Field;
use crate::vesting::Cohort;

pub const TIME_TRACKING: &str = "Time Tracking";
pub const ENVIRONMENTAL: &str = "Environmental Processes";
pub const BLOCK_UTILIZATION: &str = "Block Utilization";
pub const REFERENCE_SUBSIDY: &str = "Reference Subsidy";
pub const ARCHIVE: &str = "Archive";
pub const PLEDGE_SECTORS: &str = "Pledge Sectors";
pub const STORAGE_FEES: &str = "Storage Fees";
pub const COMPUTE_FEES: &str = "Compute Fees";
pub const FUND_REWARD: &str = "Farmer Rewards (Fund)";
pub const ISSUANCE_REWARD: &str = "Farmer Rewards (Issuance)";
pub const REWARD_SPLIT: &str = "Farmer Rewards (Split)";
pub const UNVEST: &str = "Unvest";
pub const SLASH: &str = "Slash";
pub const STAKING: &str = "Staking";
pub const TRANSFERS: &str = "Transfers";
pub const SUPPLY_METRICS: &str = "Supply Metrics";
pub const ACCUMULATORS: &str = "Running Totals";

/// Every block of the default transition, including the disabled ones.
pub fn default_blocks() -> Vec<Block> {
    let cohort_fields: Vec<Field> = Cohort::ALL.iter().map(|c| c.field()).collect();

    vec![
        Block::new(TIME_TRACKING)
            .policy("evolve_time", time::p_evolve_time)
            .replace(&[Field::DeltaDays, Field::DeltaBlocks])
            .accumulate(&[Field::DaysPassed, Field::BlocksPassed]),
        Block::new(ENVIRONMENTAL)
            .update(Field::AverageBaseFee, environment::s_average_base_fee)
            .update(Field::AveragePriorityFee, environment::s_average_priority_fee)
            .update(Field::AverageComputeWeightPerTx, environment::s_average_compute_weight_per_tx)
            .update(Field::AverageComputeWeightPerBundle, environment::s_average_compute_weight_per_bundle)
            .update(Field::AverageTransactionSize, environment::s_average_transaction_size)
            .update(Field::AverageBundleSize, environment::s_average_bundle_size)
            .update(Field::BundleCount, environment::s_bundle_count),
        Block::new(BLOCK_UTILIZATION)
            .policy("block_utilization", environment::p_block_utilization)
            .replace(&[Field::TransactionCount, Field::BlockUtilization]),
        Block::new(REFERENCE_SUBSIDY).update(Field::ReferenceSubsidy, rewards::s_reference_subsidy),
        Block::new(ARCHIVE)
            .policy("archive", storage::p_archive)
            .accumulate(&[Field::BufferSize, Field::BlockchainHistorySize]),
        Block::new(PLEDGE_SECTORS)
            .policy("pledge_sectors", storage::p_pledge_sectors)
            .accumulate(&[Field::TotalSpacePledged])
            .replace(&[Field::NewlyPledgedSpace]),
        Block::new(STORAGE_FEES)
            .policy("storage_fees", storage::p_storage_fees)
            .replace(&[
                Field::FreeSpace,
                Field::StorageFeeInCreditsPerBytes,
                Field::ExtrinsicLengthInBytes,
                Field::StorageFeeVolume,
                Field::StorageFeesToFarmers,
                Field::StorageFeesToFund,
            ])
            .accumulate(&[Field::FarmersBalance, Field::FundBalance, Field::HoldersBalance]),
        Block::new(COMPUTE_FEES)
            .policy("compute_fees", compute::p_compute_fees)
            .replace(&[
                Field::TargetBlockDelta,
                Field::TargetedAdjustmentParameter,
                Field::ComputeFeeMultiplier,
                Field::TxComputeWeight,
                Field::BundleComputeWeight,
                Field::PriorityFeeVolume,
                Field::ComputeFeeVolume,
                Field::ComputeFeesToFarmers,
                Field::FeesToOperators,
            ])
            .accumulate(&[Field::FarmersBalance, Field::OperatorsBalance, Field::HoldersBalance]),
        Block::new(FUND_REWARD)
            .policy("fund_reward", rewards::p_fund_reward)
            .replace(&[Field::FundToFarmers])
            .accumulate(&[Field::FundBalance, Field::FarmersBalance])
            .disable(),
        Block::new(ISSUANCE_REWARD)
            .policy("reward", rewards::p_reward)
            .replace(&[
                Field::BlockReward,
                Field::RewardToProposer,
                Field::RewardToVoters,
                Field::PerRecipientReward,
            ])
            .accumulate(&[Field::RewardIssuanceBalance, Field::FarmersBalance]),
        Block::new(REWARD_SPLIT)
            .policy("split_reward", rewards::p_split_reward)
            .replace(&[Field::RewardToFund])
            .accumulate(&[Field::FarmersBalance, Field::FundBalance]),
        Block::new(UNVEST)
            .policy("unvest", vesting::p_unvest)
            .replace(&[Field::AllocatedTokens])
            .replace(&cohort_fields)
            .accumulate(&[Field::HoldersBalance, Field::OtherIssuanceBalance]),
        Block::new(SLASH)
            .policy("slash", staking::p_slash)
            .replace(&[Field::SlashValue, Field::SlashToFund, Field::SlashToHolders, Field::SlashToBurn])
            .accumulate(&[
                Field::StakingPoolBalance,
                Field::FundBalance,
                Field::HoldersBalance,
                Field::BurntBalance,
                Field::OperatorPoolShares,
                Field::NominatorPoolShares,
            ]),
        Block::new(STAKING)
            .policy("staking", staking::p_staking)
            .replace(&[Field::OperatorStake, Field::NominatorStake, Field::PoolSharePrice])
            .accumulate(&[
                Field::OperatorsBalance,
                Field::NominatorsBalance,
                Field::StakingPoolBalance,
                Field::OperatorPoolShares,
                Field::NominatorPoolShares,
            ]),
        Block::new(TRANSFERS)
            .policy("transfers", transfers::p_transfers)
            .accumulate(&[
                Field::FarmersBalance,
                Field::OperatorsBalance,
                Field::HoldersBalance,
                Field::NominatorsBalance,
            ]),
        Block::new(SUPPLY_METRICS)
            .policy("supply_metrics", accounting::p_supply_metrics)
            .replace(&[
                Field::CirculatingSupply,
                Field::UserSupply,
                Field::EarnedSupply,
                Field::EarnedMinusBurnedSupply,
                Field::IssuedSupply,
                Field::TotalSupply,
                Field::SumOfStocks,
                Field::StorageFeePerRewards,
            ]),
        Block::new(ACCUMULATORS)
            .policy("accumulators", accounting::p_accumulators)
            .accumulate(&[
                Field::CummRewards,
                Field::CummStorageFeesToFarmers,
                Field::CummComputeFeesToFarmers,
            ]),
    ]
}

/// The default transition with disabled blocks compiled out.
pub fn default_pipeline() -> Pipeline {
    Pipeline::builder().blocks(default_blocks()).build()
}
