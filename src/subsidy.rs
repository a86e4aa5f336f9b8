// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Reference Subsidy

//! Reference subsidy curve.
//!
//! A [`SubsidyComponent`] pays a constant rate `α` per block during its
//! initial period, capped by its cumulative budget `Ω`, then decays through
//! an exponential tail parameterised by the budget left at the end of the
//! linear phase. Components are summed into the protocol's reference subsidy.

use serde::{Deserialize, Serialize};

use crate::units::{Blocks, Credits, BLOCKS_PER_MONTH, BLOCKS_PER_YEAR, ISSUANCE_FOR_FARMERS};

/// One phase of the issuance schedule, expressed in block units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SubsidyComponent {
    pub initial_period_start: Blocks,
    pub initial_period_duration: Blocks,
    /// Ω: upper bound on everything this component may ever pay out.
    pub max_cumulative_subsidy: Credits,
    /// α: per-block rate during the linear phase.
    pub max_reference_subsidy: Credits,
}

impl SubsidyComponent {
    pub fn new(start: Blocks, duration: Blocks, max_cumulative: Credits, max_rate: Credits) -> Self {
        Self {
            initial_period_start: start,
            initial_period_duration: duration,
            max_cumulative_subsidy: max_cumulative,
            max_reference_subsidy: max_rate,
        }
    }

    pub fn initial_period_end(&self) -> Blocks {
        self.initial_period_start + self.initial_period_duration
    }

    /// `K = Ω − α·D`: budget left once the linear phase is over.
    pub fn remaining_budget(&self) -> Credits {
        self.max_cumulative_subsidy - self.max_reference_subsidy * self.initial_period_duration
    }

    /// Subsidy rate at block `t`.
    ///
    /// The linear phase is inclusive of its end block; the exponential tail
    /// only starts strictly after it.
    pub fn subsidy(&self, t: Blocks) -> Credits {
        let alpha = self.max_reference_subsidy;
        if t < self.initial_period_start {
            0.0
        } else if t <= self.initial_period_end() {
            let disbursed = alpha * (t - self.initial_period_start);
            let omega = self.max_cumulative_subsidy;
            if disbursed >= omega {
                0.0
            } else if disbursed + alpha > omega {
                omega - disbursed
            } else {
                alpha
            }
        } else {
            let k = self.remaining_budget();
            if k <= 0.0 {
                return 0.0;
            }
            let elapsed = t - self.initial_period_end();
            alpha * (-alpha / (k * elapsed).max(1.0)).exp()
        }
    }
}

/// Sum of all component rates at block `t`.
pub fn reference_subsidy(components: &[SubsidyComponent], t: Blocks) -> Credits {
    components.iter().map(|c| c.subsidy(t)).sum()
}

// ─── Preset schedules ────────────────────────────────────────────────────────

/// Whole farmer budget released linearly over roughly twenty years.
pub fn constant_single_component() -> Vec<SubsidyComponent> {
    let duration = 20.0 * BLOCKS_PER_YEAR;
    vec![SubsidyComponent::new(
        0.0,
        duration,
        ISSUANCE_FOR_FARMERS,
        ISSUANCE_FOR_FARMERS / duration,
    )]
}

/// Half the farmer budget linear over two years, the rest through the tail.
pub fn hybrid_single_component() -> Vec<SubsidyComponent> {
    let duration = 2.0 * BLOCKS_PER_YEAR;
    let linear_budget = 0.5 * ISSUANCE_FOR_FARMERS;
    vec![SubsidyComponent::new(
        0.0,
        duration,
        ISSUANCE_FOR_FARMERS,
        linear_budget / duration,
    )]
}

/// A launch component plus a second one kicking in after six months.
pub fn hybrid_two_components() -> Vec<SubsidyComponent> {
    let launch_duration = 2.0 * BLOCKS_PER_YEAR;
    let launch_budget = 0.6 * ISSUANCE_FOR_FARMERS;
    let second_start = 6.0 * BLOCKS_PER_MONTH;
    let second_duration = 4.0 * BLOCKS_PER_YEAR;
    let second_budget = 0.4 * ISSUANCE_FOR_FARMERS;
    vec![
        SubsidyComponent::new(0.0, launch_duration, launch_budget, 0.5 * launch_budget / launch_duration),
        SubsidyComponent::new(second_start, second_duration, second_budget, 0.5 * second_budget / second_duration),
    ]
}

pub fn default_components() -> Vec<SubsidyComponent> {
    hybrid_two_components()
}
