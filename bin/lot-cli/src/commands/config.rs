// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `lot config` command: print the effective configuration as TOML.

use allocation_service::ServiceConfig;

pub async fn execute(
    mut config: ServiceConfig,
    banks: Option<usize>,
    slots: Option<usize>,
    rate: Option<u64>,
) -> anyhow::Result<()> {
    if banks.is_some() || slots.is_some() {
        config.bank_capacities = None;
    }
    if let Some(banks) = banks {
        config.banks = banks;
    }
    if let Some(slots) = slots {
        config.slots_per_bank = slots;
    }
    if let Some(rate) = rate {
        config.hourly_rate = rate;
    }
    config.validate()?;

    print!("{}", config.to_toml()?);
    Ok(())
}
