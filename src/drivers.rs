// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Credit Economy Digital Twin - Environmental & Behavioral Drivers

//! Configurable value generators.
//!
//! Every stochastic or behavioral input of the pipeline is a [`Driver`]. The
//! variants are plain data so parameter sets serialize and sweep cleanly; the
//! randomness comes from the RNG the caller threads in, never from a global.

use rand::RngCore;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::DriverError;
use crate::params::Params;
use crate::state::{Field, State};
use crate::units::DAY_TO_SECONDS;

const DAYS_PER_WEEK: f64 = 7.0;

fn default_period_days() -> f64 {
    DAYS_PER_WEEK
}

/// Anything that turns `(params, state)` plus randomness into a number.
pub trait EnvironmentalDriver {
    fn evaluate(&self, params: &Params, state: &State, rng: &mut dyn RngCore) -> Result<f64, DriverError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Driver {
    Constant { value: f64 },
    Normal { mean: f64, std_dev: f64 },
    Poisson { mean: f64 },
    /// `max(0, trunc(inner))`
    PositiveInteger { inner: Box<Driver> },
    /// `inner` clamped to `[0, 1]`
    Magnitude { inner: Box<Driver> },
    /// A fixed fraction of a state field.
    StateFraction { field: Field, fraction: f64 },
    /// Sinusoid over `period_days` simulated days, a week unless set.
    WeeklyVarying {
        mean: f64,
        amplitude: f64,
        #[serde(default = "default_period_days")]
        period_days: f64,
    },
    /// Transactions per day that fill blocks to a utilisation ratio ramping
    /// from `start` to `end` over `ramp_days`.
    Utilization { start: f64, end: f64, ramp_days: f64 },
}

impl Driver {
    pub fn constant(value: f64) -> Self {
        Driver::Constant { value }
    }

    pub fn normal(mean: f64, std_dev: f64) -> Self {
        Driver::Normal { mean, std_dev }
    }

    pub fn weekly(mean: f64, amplitude: f64) -> Self {
        Driver::WeeklyVarying { mean, amplitude, period_days: DAYS_PER_WEEK }
    }

    pub fn poisson(mean: f64) -> Self {
        Driver::Poisson { mean }
    }

    pub fn positive_integer(inner: Driver) -> Self {
        Driver::PositiveInteger { inner: Box::new(inner) }
    }

    pub fn magnitude(inner: Driver) -> Self {
        Driver::Magnitude { inner: Box::new(inner) }
    }

    pub fn state_fraction(field: Field, fraction: f64) -> Self {
        Driver::StateFraction { field, fraction }
    }

    pub fn constant_utilization(ratio: f64) -> Self {
        Driver::Utilization { start: ratio, end: ratio, ramp_days: 0.0 }
    }

    pub fn growing_utilization(start: f64, end: f64, ramp_days: f64) -> Self {
        Driver::Utilization { start, end, ramp_days }
    }

    /// True when evaluation never touches the RNG.
    pub fn is_deterministic(&self) -> bool {
        match self {
            Driver::Normal { .. } | Driver::Poisson { .. } => false,
            Driver::PositiveInteger { inner } | Driver::Magnitude { inner } => inner.is_deterministic(),
            _ => true,
        }
    }
}

impl EnvironmentalDriver for Driver {
    fn evaluate(&self, params: &Params, state: &State, rng: &mut dyn RngCore) -> Result<f64, DriverError> {
        match self {
            Driver::Constant { value } => Ok(*value),
            Driver::Normal { mean, std_dev } => {
                // rand_distr accepts a negative std dev and mirrors it.
                if !(std_dev.is_finite() && *std_dev >= 0.0) {
                    return Err(DriverError::InvalidNormal { mean: *mean, std_dev: *std_dev });
                }
                let normal = Normal::new(*mean, *std_dev).map_err(|_| DriverError::InvalidNormal {
                    mean: *mean,
                    std_dev: *std_dev,
                })?;
                Ok(normal.sample(rng))
            }
            Driver::Poisson { mean } => {
                if *mean == 0.0 {
                    return Ok(0.0);
                }
                let poisson = Poisson::new(*mean).map_err(|_| DriverError::InvalidPoisson(*mean))?;
                Ok(poisson.sample(rng))
            }
            Driver::PositiveInteger { inner } => Ok(inner.evaluate(params, state, rng)?.trunc().max(0.0)),
            Driver::Magnitude { inner } => Ok(inner.evaluate(params, state, rng)?.clamp(0.0, 1.0)),
            Driver::StateFraction { field, fraction } => Ok(state.get(*field) * fraction),
            Driver::WeeklyVarying { mean, amplitude, period_days } => {
                if !(period_days.is_finite() && *period_days > 0.0) {
                    return Err(DriverError::InvalidPeriod(*period_days));
                }
                Ok(mean + amplitude * (TAU * state.days_passed / period_days).sin())
            }
            Driver::Utilization { start, end, ramp_days } => {
                let progress = if *ramp_days > 0.0 {
                    (state.days_passed / ramp_days).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let ratio = start + (end - start) * progress;
                let blocks_per_day = DAY_TO_SECONDS / params.block_time_in_seconds;
                let tx_size = state.average_transaction_size.max(params.min_transaction_size).max(1.0);
                Ok(ratio * params.max_block_size * blocks_per_day / tx_size)
            }
        }
    }
}
