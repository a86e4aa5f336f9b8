// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Experiment Presets

//! Ready-made experiments. Each returns an [`Experiment`] that the caller
//! runs sequentially or in parallel.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::metrics::SupplyDefinition;
use crate::params::Params;
use crate::scenarios::EnvironmentalScenario;
use crate::simulation::Experiment;
use crate::subsidy::{self, SubsidyComponent};
use crate::sweep::{Sweep, SweepAxis};
use crate::units::SHANNON_IN_CREDITS;

pub const DEFAULT_SIMULATION_DAYS: f64 = 183.0;

/// Default parameters, deterministic drivers, one sample.
pub fn sanity_check(days: f64, samples: usize) -> Experiment {
    Experiment::single(Params::default()).with_days(days).with_samples(samples)
}

pub fn standard_stochastic(days: f64, samples: usize) -> Experiment {
    let params = EnvironmentalScenario::Stochastic.applied_to(Params::default());
    Experiment::single(params).with_days(days).with_samples(samples)
}

/// Default parameters against a run where nothing is routed to the fund.
pub fn fund_inclusion(days: f64, samples: usize) -> Experiment {
    let mut no_fund = Params::default().with_label("no-fund");
    no_fund.fund_tax_on_proposer_reward = 0.0;
    no_fund.fund_tax_on_storage_fees = 0.0;
    no_fund.slash_to_fund = 0.0;
    Experiment::new(vec![Params::default(), no_fund]).with_days(days).with_samples(samples)
}

/// Default voting reward split against one shared by only two recipients.
pub fn reward_split_sweep(days: f64, samples: usize) -> Experiment {
    let mut alternate = Params::default().with_label("alternate-split");
    alternate.reward_recipients = 2.0;
    Experiment::new(vec![Params::default(), alternate]).with_days(days).with_samples(samples)
}

/// Every storage-pricing supply definition under constant and growing
/// utilisation.
pub fn sweep_credit_supply(days: f64, samples: usize) -> Experiment {
    let scenarios = SweepAxis::new("scenario")
        .value("constant", |p| EnvironmentalScenario::ConstantUtilization.apply(p))
        .value("growing", |p| EnvironmentalScenario::GrowingUtilization.apply(p));
    let supplies = [
        ("supply-issued", SupplyDefinition::Issued),
        ("supply-earned", SupplyDefinition::Earned),
        ("supply-earned-minus-burned", SupplyDefinition::EarnedMinusBurned),
    ];
    let mut supply_axis = SweepAxis::new("supply");
    for (label, definition) in supplies {
        supply_axis = supply_axis.value(label, move |p| {
            p.label = label.to_string();
            p.credit_supply_definition = definition;
        });
    }

    let sweep = Sweep::new(Params::default()).axis(scenarios).axis(supply_axis).keep_labels();
    Experiment::new(sweep.cartesian_product()).with_days(days).with_samples(samples)
}

pub fn reference_subsidy_sweep(days: f64, samples: usize) -> Experiment {
    let presets: [(&str, fn() -> Vec<SubsidyComponent>); 3] = [
        ("constant-single-component", subsidy::constant_single_component),
        ("hybrid-single-component", subsidy::hybrid_single_component),
        ("hybrid-two-components", subsidy::hybrid_two_components),
    ];
    let sweep = presets
        .iter()
        .map(|(label, components)| {
            let mut params = Params::default().with_label(*label);
            params.reference_subsidy_components = components();
            params
        })
        .collect();
    Experiment::new(sweep).with_days(days).with_samples(samples)
}

/// Governance surface explored by [`psuu`].
pub fn governance_surface() -> Sweep {
    Sweep::new(Params::default().with_label("psuu"))
        .axis(SweepAxis::over("scenario", EnvironmentalScenario::ALL, |p, s| s.apply(p)))
        .axis(SweepAxis::over("subsidy_scale", [0.5, 1.0, 2.0], |p, scale| {
            for component in &mut p.reference_subsidy_components {
                component.max_reference_subsidy *= scale;
            }
        }))
        .axis(SweepAxis::over("launch_duration_scale", [0.5, 1.0], |p, scale| {
            if let Some(launch) = p.reference_subsidy_components.first_mut() {
                launch.initial_period_duration *= scale;
            }
        }))
        .axis(SweepAxis::over("reward_recipients", [2.0, 10.0], |p, n| p.reward_recipients = n))
        .axis(SweepAxis::over("weight_to_fee_shannon", [1.0, 10.0], |p, w| {
            p.weight_to_fee = w * SHANNON_IN_CREDITS
        }))
}

/// Parameter-space exploration: `sweep_samples` points drawn from the
/// governance surface (all of it when `0`), `samples` runs each.
pub fn psuu(days: f64, samples: usize, sweep_samples: usize, seed: u64) -> Experiment {
    let surface = governance_surface();
    let sweep = if sweep_samples > 0 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        surface.sample(sweep_samples, &mut rng)
    } else {
        surface.cartesian_product()
    };
    Experiment::new(sweep).with_days(days).with_samples(samples).with_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_dimensions() {
        assert_eq!(sanity_check(DEFAULT_SIMULATION_DAYS, 1).timesteps, 183);
        assert_eq!(fund_inclusion(10.0, 1).sweep.len(), 2);
        assert_eq!(reward_split_sweep(10.0, 1).sweep[1].reward_recipients, 2.0);
        assert_eq!(reference_subsidy_sweep(360.0, 1).sweep.len(), 3);
        assert_eq!(standard_stochastic(10.0, 5).samples, 5);
    }

    #[test]
    fn test_credit_supply_sweep_labels() {
        let experiment = sweep_credit_supply(10.0, 1);
        assert_eq!(experiment.sweep.len(), 6);
        assert_eq!(experiment.sweep[0].label, "supply-issued");
        assert_eq!(experiment.sweep[0].environmental_label, "constant-utilization");
        assert_eq!(experiment.sweep[5].label, "supply-earned-minus-burned");
        assert_eq!(experiment.sweep[5].environmental_label, "growing-utilization");
        assert_eq!(experiment.sweep[4].credit_supply_definition, SupplyDefinition::Earned);
    }

    #[test]
    fn test_psuu_samples_the_surface() {
        assert_eq!(governance_surface().len(), 5 * 3 * 2 * 2 * 2);
        let experiment = psuu(30.0, 2, 12, 1);
        assert_eq!(experiment.sweep.len(), 12);
        assert_eq!(experiment.trajectory_count(), 24);
        assert!(experiment.sweep.iter().all(|p| p.label.starts_with("psuu[")));
    }

    #[test]
    fn test_small_presets_run_clean() {
        let table = fund_inclusion(20.0, 1).with_invariant_checks(true).run().expect("test: run");
        assert_eq!(table.len(), 2 * 21);
    }
}
