// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # metering
//!
//! Time-metered billing for slot occupancy.
//!
//! # Key Components
//!
//! - [`MeteringLedger`]: when each requester's occupancy began; closing
//!   an occupancy yields the elapsed time.
//! - [`Clock`]: the source of timestamps. [`MonotonicClock`] in
//!   production, [`ManualClock`] in tests and simulations, [`SystemClock`]
//!   when wall-clock stamps are wanted.
//! - [`Tariff`]: rate per [`BillingPeriod`] plus a [`RoundingPolicy`];
//!   turns elapsed time into a charge.
//!
//! # Example
//! ```
//! use metering::{BillingPeriod, Clock, ManualClock, MeteringLedger, RoundingPolicy, Tariff, Timestamp};
//! use slot_bank::RequesterId;
//! use std::time::Duration;
//!
//! let clock = ManualClock::at(Timestamp::from_hours(9));
//! let ledger = MeteringLedger::new();
//! let tariff = Tariff::new(5, BillingPeriod::HOUR, RoundingPolicy::CeilMinOne);
//!
//! ledger.begin(RequesterId(1), clock.now()).unwrap();
//! clock.advance(Duration::from_secs(3 * 3600));
//! let occupancy = ledger.end(RequesterId(1), clock.now()).unwrap().unwrap();
//!
//! assert_eq!(tariff.charge(occupancy.elapsed(), 1), 15);
//! ```

mod clock;
mod error;
mod ledger;
mod period;
mod tariff;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock, Timestamp};
pub use error::MeteringError;
pub use ledger::{MeteringLedger, Occupancy};
pub use period::BillingPeriod;
pub use tariff::{RoundingPolicy, Tariff};
