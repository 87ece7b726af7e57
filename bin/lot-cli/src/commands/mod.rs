// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod config;
pub mod demo;
pub mod simulate;

use allocation_service::ServiceConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Reads `path` if given, otherwise falls back to the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ServiceConfig> {
    let config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            ServiceConfig::from_file(path)?
        }
        None => ServiceConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Visual occupancy bar (0.0-1.0 scale).
pub fn usage_bar(ratio: f64) -> String {
    let filled = (ratio * 20.0).round() as usize;
    let filled = filled.min(20);
    let empty = 20 - filled;
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(empty))
}

pub fn print_banks(snapshots: &[slot_bank::BankSnapshot]) {
    for snap in snapshots {
        let held: Vec<String> = snap
            .held
            .iter()
            .map(|h| format!("{}@{}..={}", h.requester, h.handle.start, h.handle.end))
            .collect();
        println!(
            "   bank {:<3} {}  {}",
            snap.index,
            snap.render(),
            if held.is_empty() {
                "(empty)".to_string()
            } else {
                held.join(" ")
            }
        );
    }
}
