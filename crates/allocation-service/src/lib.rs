// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # allocation-service
//!
//! Ties [`slot_bank`] and [`metering`] together into a thread-safe
//! park/vacate service.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              AllocationService               │
//! │                                              │
//! │  park(r)   ─► claim ─► BankGroup::allocate   │
//! │                      ─► MeteringLedger::begin│
//! │                                              │
//! │  vacate(r) ─► claim ─► MeteringLedger::end   │
//! │                      ─► BankGroup::release   │
//! │                      ─► Tariff ─► r.charge   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use allocation_service::{AllocationService, Requester, ServiceConfig, VehicleClass};
//! use metering::{ManualClock, Timestamp};
//! use std::time::Duration;
//!
//! let clock = ManualClock::at(Timestamp::from_hours(9));
//! let service = AllocationService::with_clock(&ServiceConfig::default(), clock.clone()).unwrap();
//!
//! let mut limo = Requester::with_vehicle(1, VehicleClass::Limo);
//! let handle = service.park(&limo).unwrap();
//! assert_eq!((handle.bank, handle.start, handle.end), (0, 0, 1));
//!
//! clock.advance(Duration::from_secs(3 * 3600));
//! let receipt = service.vacate(&mut limo).unwrap();
//! assert_eq!(receipt.amount, 15);
//! assert_eq!(limo.balance_due(), 15);
//! ```

mod claim;
pub mod config;
pub mod error;
pub mod metrics;
pub mod requester;
pub mod service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use metrics::ServiceMetrics;
pub use requester::{Requester, VehicleClass};
pub use service::{AllocationService, Operation, RequesterState, VacateReceipt};
