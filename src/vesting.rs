// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Vesting Schedule

//! Multi-cohort token unlock schedule keyed on `days_passed`.

use serde::{Deserialize, Serialize};

use crate::state::Field;
use crate::units::{Credits, Days, Percentage, DAYS_PER_YEAR, MAX_CREDIT_ISSUANCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    Investors,
    Founders,
    Team,
    Advisors,
    Vendors,
    Ambassadors,
    Testnets,
    Foundation,
    SubspaceLabs,
    SslPrivSale,
}

impl Cohort {
    pub const ALL: [Cohort; 10] = [
        Cohort::Investors,
        Cohort::Founders,
        Cohort::Team,
        Cohort::Advisors,
        Cohort::Vendors,
        Cohort::Ambassadors,
        Cohort::Testnets,
        Cohort::Foundation,
        Cohort::SubspaceLabs,
        Cohort::SslPrivSale,
    ];

    /// State field carrying the cohort's unlocked amount.
    pub fn field(self) -> Field {
        match self {
            Cohort::Investors => Field::AllocatedTokensInvestors,
            Cohort::Founders => Field::AllocatedTokensFounders,
            Cohort::Team => Field::AllocatedTokensTeam,
            Cohort::Advisors => Field::AllocatedTokensAdvisors,
            Cohort::Vendors => Field::AllocatedTokensVendors,
            Cohort::Ambassadors => Field::AllocatedTokensAmbassadors,
            Cohort::Testnets => Field::AllocatedTokensTestnets,
            Cohort::Foundation => Field::AllocatedTokensFoundation,
            Cohort::SubspaceLabs => Field::AllocatedTokensSubspaceLabs,
            Cohort::SslPrivSale => Field::AllocatedTokensSslPrivSale,
        }
    }
}

/// Unlock terms for one cohort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VestingTranche {
    pub cohort: Cohort,
    /// Fraction of `MAX_CREDIT_ISSUANCE` held by the cohort.
    pub share: Percentage,
    pub cliff_days: Days,
    /// Fraction released at the cliff.
    pub cliff_fraction: Percentage,
    /// Days over which the rest is released linearly after the cliff.
    pub linear_days: Days,
}

impl VestingTranche {
    pub fn locked(cohort: Cohort, share: Percentage) -> Self {
        Self {
            cohort,
            share,
            cliff_days: DAYS_PER_YEAR,
            cliff_fraction: 0.25,
            linear_days: 3.0 * DAYS_PER_YEAR,
        }
    }

    pub fn liquid(cohort: Cohort, share: Percentage) -> Self {
        Self {
            cohort,
            share,
            cliff_days: 0.0,
            cliff_fraction: 1.0,
            linear_days: 0.0,
        }
    }

    pub fn total(&self) -> Credits {
        self.share * MAX_CREDIT_ISSUANCE
    }

    /// Fraction of the tranche unlocked after `days`. Non-decreasing in `days`.
    pub fn unlocked_fraction(&self, days: Days) -> Percentage {
        if days < self.cliff_days {
            return 0.0;
        }
        let rest = 1.0 - self.cliff_fraction;
        let linear = if self.linear_days > 0.0 {
            ((days - self.cliff_days) / self.linear_days).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.cliff_fraction + rest * linear
    }

    pub fn allocation(&self, days: Days) -> Credits {
        self.total() * self.unlocked_fraction(days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VestingSchedule {
    pub tranches: Vec<VestingTranche>,
}

impl VestingSchedule {
    pub fn allocated_tokens(&self, days: Days) -> Credits {
        self.tranches.iter().map(|t| t.allocation(days)).sum()
    }

    pub fn total_share(&self) -> Percentage {
        self.tranches.iter().map(|t| t.share).sum()
    }
}

impl Default for VestingSchedule {
    fn default() -> Self {
        Self {
            tranches: vec![
                VestingTranche::locked(Cohort::Investors, 0.2153),
                VestingTranche::locked(Cohort::Founders, 0.02),
                VestingTranche::locked(Cohort::Team, 0.05),
                VestingTranche::locked(Cohort::Advisors, 0.015),
                VestingTranche::locked(Cohort::Vendors, 0.02),
                VestingTranche::locked(Cohort::Ambassadors, 0.01),
                VestingTranche::liquid(Cohort::Testnets, 0.0175),
                VestingTranche::liquid(Cohort::Foundation, 0.1497),
                VestingTranche::liquid(Cohort::SubspaceLabs, 0.05),
                VestingTranche::liquid(Cohort::SslPrivSale, 0.0122),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{FARMER_ISSUANCE_SHARE, OTHER_ISSUANCE};

    #[test]
    fn test_locked_tranche_cliff_and_linear_release() {
        let t = VestingTranche::locked(Cohort::Team, 0.05);
        assert_eq!(t.unlocked_fraction(0.0), 0.0);
        assert_eq!(t.unlocked_fraction(364.0), 0.0);
        assert!((t.unlocked_fraction(365.0) - 0.25).abs() < f64::EPSILON);
        let halfway = 365.0 + 1.5 * 365.0;
        assert!((t.unlocked_fraction(halfway) - 0.625).abs() < 1e-12);
        assert!((t.unlocked_fraction(10_000.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_liquid_tranche_unlocked_at_launch() {
        let t = VestingTranche::liquid(Cohort::Foundation, 0.1);
        assert_eq!(t.unlocked_fraction(0.0), 1.0);
        assert!((t.allocation(0.0) - 0.1 * MAX_CREDIT_ISSUANCE).abs() < 1e-3);
    }

    #[test]
    fn test_default_schedule_fits_other_issuance() {
        let schedule = VestingSchedule::default();
        assert!(schedule.total_share() < 1.0 - FARMER_ISSUANCE_SHARE);
        assert!(schedule.allocated_tokens(1e6) <= OTHER_ISSUANCE);
    }

    #[test]
    fn test_schedule_is_monotonic() {
        let schedule = VestingSchedule::default();
        let mut last = 0.0;
        for day in 0..2_000 {
            let allocated = schedule.allocated_tokens(day as f64);
            assert!(allocated >= last, "allocation dropped on day {}", day);
            last = allocated;
        }
    }
}
