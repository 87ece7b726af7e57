// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `lot simulate` command: concurrent park/vacate traffic.
//!
//! Each worker owns a small fleet (one vehicle of every class) and, once
//! per round, flips a pseudo-random subset between parked and vacated on
//! a blocking thread. Between rounds the simulated clock moves forward
//! and every bank is checked for overlapping or leaked ranges. At the end
//! all remaining vehicles are vacated and the billing totals reconciled.

use allocation_service::{
    AllocationService, Requester, ServiceConfig, ServiceError, ServiceMetrics, VehicleClass,
};
use metering::{ManualClock, Timestamp};
use slot_bank::{BankSnapshot, BankStats};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, serde::Serialize)]
struct Tally {
    parked: u64,
    vacated: u64,
    turned_away: u64,
}

impl Tally {
    fn add(&mut self, other: Tally) {
        self.parked += other.parked;
        self.vacated += other.vacated;
        self.turned_away += other.turned_away;
    }
}

#[derive(Debug, serde::Serialize)]
struct Report {
    workers: usize,
    rounds: usize,
    simulated_hours: u64,
    tally: Tally,
    billed: u64,
    metrics: ServiceMetrics,
    bank_stats: BankStats,
    banks: Vec<BankSnapshot>,
}

struct Worker {
    fleet: Vec<Requester>,
    seed: u64,
}

pub async fn execute(
    config: ServiceConfig,
    workers: usize,
    rounds: usize,
    hours: u64,
    json: bool,
) -> anyhow::Result<()> {
    anyhow::ensure!(workers > 0, "at least one worker is required");
    anyhow::ensure!(rounds > 0, "at least one round is required");

    let clock = ManualClock::at(Timestamp::default());
    let service = Arc::new(AllocationService::with_clock(&config, clock.clone())?);
    let step = Duration::from_millis(hours.saturating_mul(3_600_000) / rounds as u64);

    let mut pool: Vec<Worker> = (0..workers as u64)
        .map(|w| Worker {
            fleet: VehicleClass::ALL
                .iter()
                .zip(0u64..)
                .map(|(&class, k)| Requester::with_vehicle(w * 10 + k, class))
                .collect(),
            seed: w.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1,
        })
        .collect();

    tracing::info!(workers, rounds, ?step, "starting simulation");

    let mut tally = Tally::default();
    for round in 0..rounds {
        let mut tasks = Vec::with_capacity(pool.len());
        for mut worker in pool.drain(..) {
            let service = Arc::clone(&service);
            tasks.push(tokio::task::spawn_blocking(move || {
                let t = run_round(&service, &mut worker)?;
                Ok::<_, ServiceError>((worker, t))
            }));
        }
        for task in tasks {
            let (worker, t) = task.await??;
            tally.add(t);
            pool.push(worker);
        }

        let banks = service.snapshot()?;
        for bank in &banks {
            bank.verify()?;
        }
        let occupied: usize = banks.iter().map(BankSnapshot::occupied_slots).sum();
        tracing::debug!(round, occupied, "round complete");
        clock.advance(step);
    }

    // Settle up.
    for worker in &mut pool {
        for vehicle in &mut worker.fleet {
            if service.placement(vehicle.id())?.is_some() {
                service.vacate(vehicle)?;
                tally.vacated += 1;
            }
        }
    }

    let banks = service.snapshot()?;
    anyhow::ensure!(
        banks.iter().all(|b| b.occupied_slots() == 0),
        "slots still occupied after every vehicle left"
    );
    let billed: u64 = pool
        .iter()
        .flat_map(|w| w.fleet.iter())
        .map(Requester::balance_due)
        .sum();
    let metrics = service.metrics();
    anyhow::ensure!(
        billed == metrics.total_billed,
        "balances ({billed}) disagree with billed total ({})",
        metrics.total_billed
    );

    let report = Report {
        workers,
        rounds,
        simulated_hours: hours,
        tally,
        billed,
        metrics,
        bank_stats: service.bank_stats()?,
        banks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, service.total_capacity());
    }
    Ok(())
}

fn run_round(service: &AllocationService, worker: &mut Worker) -> Result<Tally, ServiceError> {
    let mut tally = Tally::default();
    for vehicle in &mut worker.fleet {
        worker.seed = xorshift(worker.seed);
        if worker.seed % 3 == 0 {
            continue;
        }
        if service.placement(vehicle.id())?.is_some() {
            service.vacate(vehicle)?;
            tally.vacated += 1;
        } else {
            match service.park(vehicle) {
                Ok(_) => tally.parked += 1,
                Err(ServiceError::CapacityUnavailable { .. }) => tally.turned_away += 1,
                Err(e) => return Err(e),
            }
        }
    }
    Ok(tally)
}

fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

fn print_report(report: &Report, capacity: usize) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               lot · Simulation Report                ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Workers:     {}", report.workers);
    println!("  Rounds:      {}", report.rounds);
    println!("  Sim. hours:  {}", report.simulated_hours);
    println!();

    // ── Traffic ────────────────────────────────────────────────
    println!("  Traffic");
    println!("   Parked:       {}", report.tally.parked);
    println!("   Vacated:      {}", report.tally.vacated);
    println!("   Turned away:  {}", report.tally.turned_away);
    println!("   Billed:       {}", report.billed);
    println!();

    // ── Banks ──────────────────────────────────────────────────
    // Sum of per-bank peaks, an upper bound on simultaneous occupancy.
    let peak = report.bank_stats.peak_occupied_slots;
    let ratio = if capacity == 0 {
        0.0
    } else {
        peak as f64 / capacity as f64
    };
    println!("  Banks");
    println!(
        "   Peak:         {peak} / {capacity} slots  {}",
        super::usage_bar(ratio)
    );
    println!("   {}", report.bank_stats.summary());
    println!();
    println!("  {}", report.metrics.summary());
}
