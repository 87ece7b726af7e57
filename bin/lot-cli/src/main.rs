// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # lot
//!
//! Command-line driver for the contiguous slot allocator.
//!
//! ## Usage
//! ```bash
//! # Walk through the three-bank demo
//! lot demo
//!
//! # Hammer a service from several workers and check consistency
//! lot simulate --workers 8 --rounds 50 --hours 6
//!
//! # Print (or write) a configuration file
//! lot config --banks 4 --slots 10 --rate 3 > lot.toml
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lot",
    about = "Contiguous slot allocation with time-metered billing",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the car / limo / semi-truck walkthrough.
    Demo,

    /// Drive a shared service from concurrent workers.
    Simulate {
        /// Number of concurrent workers.
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Park/vacate rounds per worker.
        #[arg(short, long, default_value_t = 20)]
        rounds: usize,

        /// Simulated hours spread evenly across the rounds.
        #[arg(long, default_value_t = 8)]
        hours: u64,

        /// Print the final report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML.
    Config {
        /// Number of banks.
        #[arg(long)]
        banks: Option<usize>,

        /// Slots per bank.
        #[arg(long)]
        slots: Option<usize>,

        /// Amount charged per billing period.
        #[arg(long)]
        rate: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Demo => commands::demo::execute(config).await,
        Commands::Simulate {
            workers,
            rounds,
            hours,
            json,
        } => commands::simulate::execute(config, workers, rounds, hours, json).await,
        Commands::Config { banks, slots, rate } => {
            commands::config::execute(config, banks, slots, rate).await
        }
    }
}
