// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # slot-bank
//!
//! First-fit allocation of contiguous slot runs over fixed-capacity,
//! linear banks.
//!
//! # Key Components
//!
//! - [`ResourceUnit`]: how many adjacent slots a request needs (never zero).
//! - [`RequesterId`]: the stable key a requester is tracked by.
//! - [`SlotBank`]: one bank: slot bitmap, handle map, first-fit search,
//!   release. Each bank serialises its own operations behind a mutex.
//! - [`BankGroup`]: an ordered set of banks; allocation falls back from
//!   one bank to the next in index order.
//! - [`AllocationHandle`]: the inclusive slot range a requester holds.
//! - [`BankSnapshot`] / [`BankStats`]: inspection and diagnostics.
//!
//! # Ownership Model
//!
//! ```text
//! BankGroup::allocate(id, unit)
//!       │  bank 0, bank 1, ... in order
//!       ▼
//!   SlotBank::try_allocate ──► handles: id → AllocationHandle
//!       │
//!       │  BankGroup::release(id)
//!       ▼
//!   owning SlotBank frees [start..=end]
//! ```
//!
//! Only the owning bank stores a handle. Everything else refers to an
//! allocation by [`RequesterId`].
//!
//! # Example
//! ```
//! use slot_bank::{BankGroup, RequesterId, ResourceUnit};
//!
//! let group = BankGroup::uniform(3, 2);
//! let car = ResourceUnit::new(1).unwrap();
//! let limo = ResourceUnit::new(2).unwrap();
//! let truck = ResourceUnit::new(3).unwrap();
//!
//! assert_eq!(group.allocate(RequesterId(1), car).unwrap().unwrap().bank, 0);
//! assert_eq!(group.allocate(RequesterId(2), limo).unwrap().unwrap().bank, 1);
//! assert!(group.allocate(RequesterId(3), truck).unwrap().is_none());
//!
//! assert!(group.release(RequesterId(1)).unwrap());
//! assert!(!group.release(RequesterId(3)).unwrap());
//! ```

mod bank;
mod error;
mod group;
mod handle;
mod snapshot;
mod stats;
mod unit;

pub use bank::{SlotBank, SlotState};
pub use error::BankError;
pub use group::BankGroup;
pub use handle::AllocationHandle;
pub use snapshot::{BankSnapshot, HeldRange};
pub use stats::BankStats;
pub use unit::{RequesterId, ResourceUnit};
