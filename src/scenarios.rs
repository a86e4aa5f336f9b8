// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Environmental Scenarios

//! Named driver overrides applied on top of a parameter set.

use serde::{Deserialize, Serialize};

use crate::drivers::Driver;
use crate::params::Params;
use crate::units::BLOCKS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentalScenario {
    /// Every driver constant.
    Standard,
    Stochastic,
    WeeklyVarying,
    /// Blocks held at 50% fullness.
    ConstantUtilization,
    /// Fullness ramping from 1% to 100% over two years.
    GrowingUtilization,
}

impl EnvironmentalScenario {
    pub const ALL: [EnvironmentalScenario; 5] = [
        EnvironmentalScenario::Standard,
        EnvironmentalScenario::Stochastic,
        EnvironmentalScenario::WeeklyVarying,
        EnvironmentalScenario::ConstantUtilization,
        EnvironmentalScenario::GrowingUtilization,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EnvironmentalScenario::Standard => "standard",
            EnvironmentalScenario::Stochastic => "stochastic",
            EnvironmentalScenario::WeeklyVarying => "weekly-varying",
            EnvironmentalScenario::ConstantUtilization => "constant-utilization",
            EnvironmentalScenario::GrowingUtilization => "growing-utilization",
        }
    }

    pub fn apply(self, params: &mut Params) {
        params.environmental_label = self.label().to_string();
        match self {
            EnvironmentalScenario::Standard => {}
            EnvironmentalScenario::Stochastic => {
                let behavior = &mut params.behavior;
                behavior.operator_stake_per_ts = share(0.01, 0.02);
                behavior.nominator_stake_per_ts = share(0.01, 0.02);
                behavior.transfer_farmer_to_holder_per_day = share(0.05, 0.05);
                behavior.transfer_operator_to_holder_per_day = share(0.05, 0.05);
                behavior.transfer_holder_to_nominator_per_day = share(0.01, 0.02);
                behavior.transfer_holder_to_operator_per_day = share(0.01, 0.02);

                let env = &mut params.environment;
                env.base_fee = count(1.0, 1.0);
                env.priority_fee = count(3.0, 5.0);
                env.compute_weights_per_tx = count(60_000_000.0, 15_000_000.0);
                env.compute_weights_per_bundle = count(10_000_000_000.0, 5_000_000_000.0);
                env.transaction_size = count(256.0, 100.0);
                env.bundle_size = count(1_500.0, 1_000.0);
                env.transaction_count_per_day = Driver::poisson(BLOCKS_PER_DAY);
                env.bundle_count_per_day = Driver::poisson(6.0 * BLOCKS_PER_DAY);
                env.slash_per_day = Driver::poisson(0.1);
                env.new_sectors_per_day = count(1_000.0, 500.0);
            }
            EnvironmentalScenario::WeeklyVarying => {
                params.environment.base_fee = Driver::weekly(1.0, 0.5);
                params.environment.priority_fee = Driver::weekly(3.0, 1.5);
            }
            EnvironmentalScenario::ConstantUtilization => {
                params.environment.transaction_count_per_day = Driver::constant_utilization(0.5);
            }
            EnvironmentalScenario::GrowingUtilization => {
                params.environment.transaction_count_per_day = Driver::growing_utilization(0.01, 1.0, 2.0 * 365.0);
            }
        }
    }

    pub fn applied_to(self, mut params: Params) -> Params {
        self.apply(&mut params);
        params
    }
}

fn share(mean: f64, std_dev: f64) -> Driver {
    Driver::magnitude(Driver::normal(mean, std_dev))
}

fn count(mean: f64, std_dev: f64) -> Driver {
    Driver::positive_integer(Driver::normal(mean, std_dev))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stochastic_uses_randomness() {
        for scenario in EnvironmentalScenario::ALL {
            let params = scenario.applied_to(Params::default());
            assert_eq!(params.environmental_label, scenario.label());
            assert_eq!(params.is_deterministic(), scenario != EnvironmentalScenario::Stochastic, "{:?}", scenario);
        }
    }

    #[test]
    fn test_scenario_serializes_as_its_label() {
        for scenario in EnvironmentalScenario::ALL {
            let json = serde_json::to_string(&scenario).expect("test: serialize");
            assert_eq!(json, format!("\"{}\"", scenario.label()));
        }
    }
}
