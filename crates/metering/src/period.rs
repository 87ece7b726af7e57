// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Billing period configuration and parsing.
//!
//! A [`BillingPeriod`] is the length of one billable unit of occupancy
//! (an hour, by default). It parses from short human-readable strings
//! for config files and the CLI.

use crate::MeteringError;
use std::fmt;
use std::time::Duration;

/// Length of one billable unit of time.
///
/// # Parsing
/// - `"1h"` → one hour
/// - `"30m"` → thirty minutes
/// - `"45s"` → forty-five seconds
/// - `"3600"` → raw seconds
///
/// # Examples
/// ```
/// use metering::BillingPeriod;
///
/// let p = BillingPeriod::parse("2h").unwrap();
/// assert_eq!(p.as_secs(), 7200);
/// assert_eq!(p.to_string(), "2h");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct BillingPeriod {
    secs: u64,
}

impl BillingPeriod {
    /// One hour, the classic parking-meter unit.
    pub const HOUR: BillingPeriod = BillingPeriod { secs: 3600 };

    /// Creates a period from seconds. Rejects zero.
    pub fn from_secs(secs: u64) -> Result<Self, MeteringError> {
        if secs == 0 {
            return Err(MeteringError::InvalidPeriod("period must be non-zero".into()));
        }
        Ok(Self { secs })
    }

    pub fn from_hours(hours: u64) -> Result<Self, MeteringError> {
        Self::from_secs(hours.saturating_mul(3600))
    }

    pub fn as_secs(&self) -> u64 {
        self.secs
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.secs)
    }

    /// Parses a human-readable period string.
    ///
    /// Accepted suffixes are `h`, `m` and `s` (case-insensitive); a plain
    /// number is taken as seconds.
    pub fn parse(s: &str) -> Result<Self, MeteringError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MeteringError::InvalidPeriod("empty period string".into()));
        }

        let lower = s.to_lowercase();
        let (num_str, multiplier) = if let Some(n) = lower.strip_suffix('h') {
            (n, 3600)
        } else if let Some(n) = lower.strip_suffix('m') {
            (n, 60)
        } else if let Some(n) = lower.strip_suffix('s') {
            (n, 1)
        } else {
            (lower.as_str(), 1)
        };

        let value: u64 = num_str.trim().parse().map_err(|_| {
            MeteringError::InvalidPeriod(format!(
                "'{s}': expected a number followed by an optional suffix (h, m, s)"
            ))
        })?;

        let secs = value
            .checked_mul(multiplier)
            .ok_or_else(|| MeteringError::InvalidPeriod(format!("'{s}' overflows")))?;

        Self::from_secs(secs)
    }
}

impl TryFrom<u64> for BillingPeriod {
    type Error = MeteringError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<BillingPeriod> for u64 {
    fn from(period: BillingPeriod) -> Self {
        period.secs
    }
}

impl Default for BillingPeriod {
    fn default() -> Self {
        Self::HOUR
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secs % 3600 == 0 {
            write!(f, "{}h", self.secs / 3600)
        } else if self.secs % 60 == 0 {
            write!(f, "{}m", self.secs / 60)
        } else {
            write!(f, "{}s", self.secs)
        }
    }
}
