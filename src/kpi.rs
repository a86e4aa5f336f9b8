// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Trajectory KPIs

//! Per-trajectory indicators, median-threshold goal scoring and Monte Carlo
//! summaries over the output table.

use serde::Serialize;

use crate::table::{Row, SimulationTable};
use crate::units::DAYS_PER_YEAR;

// ─── Monte Carlo Statistics ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

/// Middle value; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ─── KPIs ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    MeanFarmerSubsidyFactor,
    MeanProposingRewardsPerNewlyPledgedSpace,
    MeanProposerRewardMinusVoterReward,
    CummRewardsBefore1yr,
    StorageFeeShareOfFeeVolume,
    CummRewards,
}

impl Kpi {
    pub const ALL: [Kpi; 6] = [
        Kpi::MeanFarmerSubsidyFactor,
        Kpi::MeanProposingRewardsPerNewlyPledgedSpace,
        Kpi::MeanProposerRewardMinusVoterReward,
        Kpi::CummRewardsBefore1yr,
        Kpi::StorageFeeShareOfFeeVolume,
        Kpi::CummRewards,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    LargerThanMedian,
    SmallerThanMedian,
}

impl Threshold {
    pub fn passes(self, value: f64, median: f64) -> bool {
        match self {
            Threshold::LargerThanMedian => value > median,
            Threshold::SmallerThanMedian => value < median,
        }
    }
}

/// Default success direction of every KPI.
pub const KPI_THRESHOLDS: [(Kpi, Threshold); 6] = [
    (Kpi::MeanFarmerSubsidyFactor, Threshold::SmallerThanMedian),
    (Kpi::MeanProposingRewardsPerNewlyPledgedSpace, Threshold::LargerThanMedian),
    (Kpi::MeanProposerRewardMinusVoterReward, Threshold::LargerThanMedian),
    (Kpi::CummRewardsBefore1yr, Threshold::LargerThanMedian),
    (Kpi::StorageFeeShareOfFeeVolume, Threshold::SmallerThanMedian),
    (Kpi::CummRewards, Threshold::SmallerThanMedian),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryKpis {
    pub subset: usize,
    pub run: usize,
    pub label: String,
    /// Mean over timesteps of cumulative rewards / cumulative farmer revenue.
    pub mean_farmer_subsidy_factor: f64,
    pub mean_proposing_rewards_per_newly_pledged_space: f64,
    pub mean_proposer_reward_minus_voter_reward: f64,
    pub cumm_rewards_before_1yr: f64,
    /// Storage fee volume over storage plus compute fee volume.
    pub storage_fee_share_of_fee_volume: f64,
    pub cumm_rewards: f64,
}

impl TrajectoryKpis {
    /// KPIs of one trajectory's rows, given in timestep order.
    pub fn from_rows(rows: &[&Row]) -> Option<Self> {
        let first = rows.first()?;

        let subsidy_factors: Vec<f64> = rows
            .iter()
            .filter_map(|r| {
                let s = &r.state;
                let revenue = s.cumm_rewards + s.cumm_storage_fees_to_farmers + s.cumm_compute_fees_to_farmers;
                (revenue > 0.0).then(|| s.cumm_rewards / revenue)
            })
            .collect();

        let per_space: Vec<f64> = rows
            .iter()
            .filter(|r| r.state.newly_pledged_space > 0.0)
            .map(|r| r.state.reward_to_proposer / r.state.newly_pledged_space)
            .collect();

        let proposer_minus_voter: Vec<f64> =
            rows.iter().map(|r| r.state.reward_to_proposer - r.state.reward_to_voters).collect();

        let storage: f64 = rows.iter().map(|r| r.state.storage_fee_volume).sum();
        let compute: f64 = rows.iter().map(|r| r.state.compute_fee_volume).sum();
        let fee_volume = storage + compute;

        Some(Self {
            subset: first.subset,
            run: first.run,
            label: first.label.clone(),
            mean_farmer_subsidy_factor: mean(&subsidy_factors),
            mean_proposing_rewards_per_newly_pledged_space: mean(&per_space),
            mean_proposer_reward_minus_voter_reward: mean(&proposer_minus_voter),
            cumm_rewards_before_1yr: rows
                .iter()
                .filter(|r| r.state.days_passed <= DAYS_PER_YEAR)
                .map(|r| r.state.block_reward)
                .sum(),
            storage_fee_share_of_fee_volume: if fee_volume > 0.0 { storage / fee_volume } else { 0.0 },
            cumm_rewards: rows.iter().map(|r| r.state.block_reward).sum(),
        })
    }

    pub fn get(&self, kpi: Kpi) -> f64 {
        match kpi {
            Kpi::MeanFarmerSubsidyFactor => self.mean_farmer_subsidy_factor,
            Kpi::MeanProposingRewardsPerNewlyPledgedSpace => self.mean_proposing_rewards_per_newly_pledged_space,
            Kpi::MeanProposerRewardMinusVoterReward => self.mean_proposer_reward_minus_voter_reward,
            Kpi::CummRewardsBefore1yr => self.cumm_rewards_before_1yr,
            Kpi::StorageFeeShareOfFeeVolume => self.storage_fee_share_of_fee_volume,
            Kpi::CummRewards => self.cumm_rewards,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// KPIs of every trajectory in the table.
pub fn trajectory_kpis(table: &SimulationTable) -> Vec<TrajectoryKpis> {
    table
        .trajectories()
        .into_iter()
        .filter_map(|(subset, run)| {
            let rows: Vec<&Row> = table.trajectory(subset, run).collect();
            TrajectoryKpis::from_rows(&rows)
        })
        .collect()
}

/// Number of criteria each trajectory meets against the median of its peers.
pub fn goal_scores(kpis: &[TrajectoryKpis], criteria: &[(Kpi, Threshold)]) -> Vec<usize> {
    let medians: Vec<Option<f64>> = criteria
        .iter()
        .map(|(kpi, _)| median(&kpis.iter().map(|k| k.get(*kpi)).collect::<Vec<_>>()))
        .collect();

    kpis.iter()
        .map(|k| {
            criteria
                .iter()
                .zip(&medians)
                .filter(|((kpi, threshold), mid)| mid.map_or(false, |m| threshold.passes(k.get(*kpi), m)))
                .count()
        })
        .collect()
}

/// Monte Carlo summary of one KPI across trajectories.
pub fn summarize(kpis: &[TrajectoryKpis], kpi: Kpi) -> Stats {
    Stats::from_samples(&kpis.iter().map(|k| k.get(kpi)).collect::<Vec<_>>())
}
