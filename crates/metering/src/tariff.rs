// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Converting elapsed occupancy into billable units and a charge.

use crate::{BillingPeriod, MeteringError};
use std::fmt;
use std::time::Duration;

/// How a partial billing period is rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingPolicy {
    /// Any partial period bills as a full one. Zero elapsed bills zero.
    Ceil,
    /// Like `Ceil`, but every occupancy bills at least one period,
    /// including one that starts and ends in the same instant.
    #[default]
    CeilMinOne,
}

impl RoundingPolicy {
    pub fn parse(s: &str) -> Result<Self, MeteringError> {
        match s.trim().to_lowercase().as_str() {
            "ceil" => Ok(Self::Ceil),
            "ceil-min-one" | "ceil_min_one" => Ok(Self::CeilMinOne),
            other => Err(MeteringError::InvalidRounding(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ceil => "ceil",
            Self::CeilMinOne => "ceil-min-one",
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate, period and rounding: everything needed to price an occupancy.
///
/// # Example
/// ```
/// use metering::{BillingPeriod, RoundingPolicy, Tariff};
/// use std::time::Duration;
///
/// let tariff = Tariff::new(5, BillingPeriod::HOUR, RoundingPolicy::CeilMinOne);
/// assert_eq!(tariff.charge(Duration::from_secs(3 * 3600), 1), 15);
/// // Ninety minutes round up to two hours.
/// assert_eq!(tariff.charge(Duration::from_secs(90 * 60), 1), 10);
/// // Same-instant departure still bills one hour.
/// assert_eq!(tariff.charge(Duration::ZERO, 1), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Tariff {
    /// Amount charged per billing period, in minor currency units.
    pub rate: u64,
    pub period: BillingPeriod,
    pub rounding: RoundingPolicy,
}

impl Tariff {
    pub fn new(rate: u64, period: BillingPeriod, rounding: RoundingPolicy) -> Self {
        Self {
            rate,
            period,
            rounding,
        }
    }

    /// Number of billing periods `elapsed` is charged as.
    pub fn billable_units(&self, elapsed: Duration) -> u64 {
        let period_ms = u128::from(self.period.as_secs()) * 1000;
        let units = elapsed.as_millis().div_ceil(period_ms);
        let units = u64::try_from(units).unwrap_or(u64::MAX);
        match self.rounding {
            RoundingPolicy::Ceil => units,
            RoundingPolicy::CeilMinOne => units.max(1),
        }
    }

    /// Charge for `elapsed`, scaled by `multiplier` (e.g. slots held).
    /// Saturates instead of overflowing.
    pub fn charge(&self, elapsed: Duration, multiplier: u64) -> u64 {
        self.price_units(self.billable_units(elapsed), multiplier)
    }

    /// Charge for an already-computed number of units.
    pub fn price_units(&self, units: u64, multiplier: u64) -> u64 {
        units.saturating_mul(self.rate).saturating_mul(multiplier)
    }
}
