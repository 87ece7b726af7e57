// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Requesters and the vehicle classes they park.

use slot_bank::{RequesterId, ResourceUnit};
use std::fmt;
use std::num::NonZeroUsize;

/// Standard resource-unit sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleClass {
    /// One slot.
    Car,
    /// Two slots.
    Limo,
    /// Three slots.
    SemiTruck,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [Self::Car, Self::Limo, Self::SemiTruck];

    pub fn slots(&self) -> usize {
        self.unit().size()
    }

    pub fn unit(&self) -> ResourceUnit {
        let size = match self {
            Self::Car => NonZeroUsize::MIN,
            Self::Limo => NonZeroUsize::MIN.saturating_add(1),
            Self::SemiTruck => NonZeroUsize::MIN.saturating_add(2),
        };
        ResourceUnit::from_nonzero(size)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Limo => "limo",
            Self::SemiTruck => "semi-truck",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An external party that parks a fixed-size unit and accrues charges.
///
/// The requester owns its balance; the service only ever adds to it when
/// a vacate succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    id: RequesterId,
    unit: ResourceUnit,
    balance_due: u64,
}

impl Requester {
    pub fn new(id: u64, unit: ResourceUnit) -> Self {
        Self {
            id: RequesterId(id),
            unit,
            balance_due: 0,
        }
    }

    pub fn with_vehicle(id: u64, class: VehicleClass) -> Self {
        Self::new(id, class.unit())
    }

    pub fn id(&self) -> RequesterId {
        self.id
    }

    pub fn unit(&self) -> ResourceUnit {
        self.unit
    }

    /// Total charged so far.
    pub fn balance_due(&self) -> u64 {
        self.balance_due
    }

    /// Adds `amount` to the balance due.
    pub fn charge(&mut self, amount: u64) {
        self.balance_due = self.balance_due.saturating_add(amount);
    }
}
