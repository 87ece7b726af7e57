// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `lot demo` command: the three-vehicle walkthrough.
//!
//! Parks a car, a limo and a semi-truck at 09:00 against the configured
//! banks, then vacates whoever got in at 12:00 and prints the bill.

use allocation_service::{AllocationService, Requester, ServiceConfig, ServiceError, VehicleClass};
use metering::{ManualClock, Timestamp};

pub async fn execute(config: ServiceConfig) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               lot · Allocation Demo                  ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let clock = ManualClock::at(Timestamp::from_hours(9));
    let service = AllocationService::with_clock(&config, clock.clone())?;

    let tariff = service.tariff();
    println!("  Config:");
    println!("   Banks:    {:?}", config.resolve_capacities());
    println!(
        "   Tariff:   {} per {} ({})",
        tariff.rate, tariff.period, tariff.rounding
    );
    println!();

    let mut vehicles: Vec<Requester> = VehicleClass::ALL
        .iter()
        .zip(1u64..)
        .map(|(&class, id)| Requester::with_vehicle(id, class))
        .collect();

    // ── Park at 09:00 ──────────────────────────────────────────
    println!("  09:00  Parking");
    let mut parked = Vec::new();
    for (vehicle, class) in vehicles.iter().zip(VehicleClass::ALL) {
        match service.park(vehicle) {
            Ok(handle) => {
                println!("   {:<11} {}  -> {handle}", class.name(), vehicle.id());
                parked.push(vehicle.id());
            }
            Err(ServiceError::CapacityUnavailable { slots, .. }) => {
                println!(
                    "   {:<11} {}  -> rejected, no run of {slots} free slots",
                    class.name(),
                    vehicle.id()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    println!();
    super::print_banks(&service.snapshot()?);
    println!();

    // ── Vacate at 12:00 ────────────────────────────────────────
    clock.set(Timestamp::from_hours(12));
    println!("  12:00  Vacating");
    for vehicle in vehicles.iter_mut().filter(|v| parked.contains(&v.id())) {
        let receipt = service.vacate(vehicle)?;
        println!(
            "   {}  {} period(s), charged {}  (balance {})",
            vehicle.id(),
            receipt.billed_units,
            receipt.amount,
            vehicle.balance_due()
        );
    }
    println!();
    super::print_banks(&service.snapshot()?);
    println!();
    println!("  {}", service.metrics().summary());

    Ok(())
}
