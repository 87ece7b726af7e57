// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Service configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! banks = 3
//! slots_per_bank = 2
//! hourly_rate = 5
//! billing_period = "1h"
//! rounding = "ceil-min-one"
//! charge_per_slot = false
//! ```
//!
//! `bank_capacities = [4, 4, 8]` may be given instead of the two uniform
//! fields to size each bank individually.

use crate::ServiceError;
use metering::{BillingPeriod, RoundingPolicy, Tariff};
use std::path::Path;

/// Construction-time settings for an [`AllocationService`](crate::AllocationService).
///
/// Fixed for the lifetime of the service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ServiceConfig {
    /// Number of banks (ignored when `bank_capacities` is set).
    #[serde(default = "default_banks")]
    pub banks: usize,
    /// Slots per bank (ignored when `bank_capacities` is set).
    #[serde(default = "default_slots_per_bank")]
    pub slots_per_bank: usize,
    /// Explicit per-bank capacities, in bank order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_capacities: Option<Vec<usize>>,
    /// Amount charged per billing period.
    pub hourly_rate: u64,
    /// Billing period (human-readable, e.g. `"1h"`, `"30m"`).
    #[serde(default = "default_billing_period")]
    pub billing_period: String,
    /// Rounding policy name: `"ceil"` or `"ceil-min-one"`.
    #[serde(default = "default_rounding")]
    pub rounding: String,
    /// Multiply the charge by the number of slots held.
    #[serde(default)]
    pub charge_per_slot: bool,
}

fn default_banks() -> usize {
    3
}

fn default_slots_per_bank() -> usize {
    2
}

fn default_billing_period() -> String {
    "1h".to_string()
}

fn default_rounding() -> String {
    RoundingPolicy::default().as_str().to_string()
}

impl ServiceConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ServiceError> {
        toml::from_str(toml_str)
            .map_err(|e| ServiceError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ServiceError> {
        toml::to_string_pretty(self)
            .map_err(|e| ServiceError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Capacity of each bank, in bank order.
    pub fn resolve_capacities(&self) -> Vec<usize> {
        match &self.bank_capacities {
            Some(capacities) => capacities.clone(),
            None => vec![self.slots_per_bank; self.banks],
        }
    }

    pub fn parse_billing_period(&self) -> Result<BillingPeriod, ServiceError> {
        BillingPeriod::parse(&self.billing_period)
            .map_err(|e| ServiceError::ConfigError(e.to_string()))
    }

    pub fn parse_rounding(&self) -> Result<RoundingPolicy, ServiceError> {
        RoundingPolicy::parse(&self.rounding)
            .map_err(|e| ServiceError::ConfigError(e.to_string()))
    }

    /// Builds the tariff described by this config.
    pub fn tariff(&self) -> Result<Tariff, ServiceError> {
        Ok(Tariff::new(
            self.hourly_rate,
            self.parse_billing_period()?,
            self.parse_rounding()?,
        ))
    }

    /// Checks that the config describes a usable service.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let capacities = self.resolve_capacities();
        if capacities.is_empty() {
            return Err(ServiceError::ConfigError(
                "at least one bank is required".into(),
            ));
        }
        if let Some(i) = capacities.iter().position(|&c| c == 0) {
            return Err(ServiceError::ConfigError(format!(
                "bank {i} has zero capacity"
            )));
        }
        self.tariff().map(|_| ())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            banks: default_banks(),
            slots_per_bank: default_slots_per_bank(),
            bank_capacities: None,
            hourly_rate: 5,
            billing_period: default_billing_period(),
            rounding: default_rounding(),
            charge_per_slot: false,
        }
    }
}
