// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Parameters

//! Per-sweep-point parameter record.
//!
//! A [`Params`] value is immutable for the lifetime of a trajectory. It
//! serializes to JSON so parameter sets can be stored next to their results.

use serde::{Deserialize, Serialize};

use crate::drivers::Driver;
use crate::error::EngineError;
use crate::metrics::SupplyDefinition;
use crate::state::Field;
use crate::subsidy::{self, SubsidyComponent};
use crate::units::*;
use crate::vesting::VestingSchedule;

/// Fractions of free balances moved by participants each timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralDrivers {
    /// Positive: stake that share of the free balance. Non-positive: withdraw
    /// that share of held pool shares.
    pub operator_stake_per_ts: Driver,
    pub nominator_stake_per_ts: Driver,
    pub transfer_farmer_to_holder_per_day: Driver,
    pub transfer_operator_to_holder_per_day: Driver,
    pub transfer_holder_to_nominator_per_day: Driver,
    pub transfer_holder_to_operator_per_day: Driver,
}

impl Default for BehavioralDrivers {
    fn default() -> Self {
        Self {
            operator_stake_per_ts: Driver::constant(0.01),
            nominator_stake_per_ts: Driver::constant(0.01),
            transfer_farmer_to_holder_per_day: Driver::constant(0.05),
            transfer_operator_to_holder_per_day: Driver::constant(0.05),
            transfer_holder_to_nominator_per_day: Driver::constant(0.01),
            transfer_holder_to_operator_per_day: Driver::constant(0.01),
        }
    }
}

/// Network activity and capacity generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalDrivers {
    pub base_fee: Driver,
    pub priority_fee: Driver,
    pub compute_weights_per_tx: Driver,
    pub compute_weights_per_bundle: Driver,
    pub transaction_size: Driver,
    pub bundle_size: Driver,
    pub transaction_count_per_day: Driver,
    pub bundle_count_per_day: Driver,
    pub slash_per_day: Driver,
    /// Credits slashed per slash event.
    pub slash_amount: Driver,
    pub new_sectors_per_day: Driver,
}

impl Default for EnvironmentalDrivers {
    fn default() -> Self {
        Self {
            base_fee: Driver::constant(1.0),
            priority_fee: Driver::constant(3.0),
            compute_weights_per_tx: Driver::constant(60_000_000.0),
            compute_weights_per_bundle: Driver::constant(10_000_000_000.0),
            transaction_size: Driver::constant(256.0),
            bundle_size: Driver::constant(1_500.0),
            transaction_count_per_day: Driver::constant_utilization(0.5),
            bundle_count_per_day: Driver::constant(6.0 * BLOCKS_PER_DAY),
            slash_per_day: Driver::constant(0.1),
            slash_amount: Driver::state_fraction(Field::StakingPoolBalance, 0.001),
            new_sectors_per_day: Driver::constant(1_000.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub label: String,
    pub environmental_label: String,
    pub timestep_in_days: Days,

    // Implementation
    pub block_time_in_seconds: Seconds,
    pub archival_buffer_segment_size: Bytes,
    /// Bytes every block carries on top of transactions.
    pub header_size: Bytes,
    pub min_replication_factor: f64,
    pub max_block_size: Bytes,
    pub weight_to_fee: Credits,

    // Economics
    pub reference_subsidy_components: Vec<SubsidyComponent>,
    /// Voters sharing the per-block voting reward.
    pub reward_recipients: f64,
    pub credit_supply_definition: SupplyDefinition,
    pub vesting: VestingSchedule,

    // Fees & taxes
    pub fund_tax_on_proposer_reward: Percentage,
    pub fund_tax_on_storage_fees: Percentage,
    pub target_block_fullness: Percentage,
    pub adjustment_variable: f64,

    // Slashing
    pub slash_to_fund: Percentage,
    pub slash_to_holders: Percentage,

    // Floors applied to environmental draws
    pub min_base_fee: f64,
    pub min_compute_weights_per_tx: ComputeWeights,
    pub min_compute_weights_per_bundle: ComputeWeights,
    pub min_transaction_size: Bytes,
    pub min_bundle_size: Bytes,

    pub behavior: BehavioralDrivers,
    pub environment: EnvironmentalDrivers,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            label: "standard".to_string(),
            environmental_label: "standard".to_string(),
            timestep_in_days: 1.0,
            block_time_in_seconds: BLOCK_TIME,
            archival_buffer_segment_size: SEGMENT_SIZE,
            header_size: 6_500.0,
            min_replication_factor: 10.0,
            max_block_size: (3.75 * MIB_IN_BYTES).trunc(),
            weight_to_fee: SHANNON_IN_CREDITS,
            reference_subsidy_components: subsidy::default_components(),
            reward_recipients: 10.0,
            credit_supply_definition: SupplyDefinition::Issued,
            vesting: VestingSchedule::default(),
            fund_tax_on_proposer_reward: 0.0,
            fund_tax_on_storage_fees: 0.1,
            target_block_fullness: 0.25,
            adjustment_variable: 0.000_03,
            slash_to_fund: 0.0,
            slash_to_holders: 0.05,
            min_base_fee: 1.0,
            min_compute_weights_per_tx: 6_000_000.0,
            min_compute_weights_per_bundle: 2_000_000_000.0,
            min_transaction_size: 100.0,
            min_bundle_size: 250.0,
            behavior: BehavioralDrivers::default(),
            environment: EnvironmentalDrivers::default(),
        }
    }
}

impl Params {
    /// Parse and validate a parameter set.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let params: Params = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the storage model cannot divide by.
    pub fn validate(&self) -> Result<(), EngineError> {
        let checks = [
            ("timestep_in_days", self.timestep_in_days, self.timestep_in_days > 0.0, "must be positive"),
            ("block_time_in_seconds", self.block_time_in_seconds, self.block_time_in_seconds > 0.0, "must be positive"),
            (
                "archival_buffer_segment_size",
                self.archival_buffer_segment_size,
                self.archival_buffer_segment_size > 0.0,
                "must be positive",
            ),
            (
                "min_replication_factor",
                self.min_replication_factor,
                self.min_replication_factor >= 1.0,
                "must be at least 1",
            ),
        ];
        for (name, value, ok, reason) in checks {
            if !(ok && value.is_finite()) {
                return Err(EngineError::InvalidParams { name, value, reason });
            }
        }
        Ok(())
    }

    pub fn blocks_per_day(&self) -> Blocks {
        DAY_TO_SECONDS / self.block_time_in_seconds
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// True when no driver draws from the RNG.
    pub fn is_deterministic(&self) -> bool {
        let b = &self.behavior;
        let e = &self.environment;
        [
            &b.operator_stake_per_ts,
            &b.nominator_stake_per_ts,
            &b.transfer_farmer_to_holder_per_day,
            &b.transfer_operator_to_holder_per_day,
            &b.transfer_holder_to_nominator_per_day,
            &b.transfer_holder_to_operator_per_day,
            &e.base_fee,
            &e.priority_fee,
            &e.compute_weights_per_tx,
            &e.compute_weights_per_bundle,
            &e.transaction_size,
            &e.bundle_size,
            &e.transaction_count_per_day,
            &e.bundle_count_per_day,
            &e.slash_per_day,
            &e.slash_amount,
            &e.new_sectors_per_day,
        ]
        .iter()
        .all(|d| d.is_deterministic())
    }
}
