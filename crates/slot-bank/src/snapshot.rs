// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Point-in-time copies of bank state for display and invariant checks.

use crate::bank::SlotState;
use crate::{AllocationHandle, BankError, RequesterId};

/// One requester's range inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct HeldRange {
    pub requester: RequesterId,
    pub handle: AllocationHandle,
}

/// A consistent copy of one bank, taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BankSnapshot {
    pub index: usize,
    pub capacity: usize,
    pub slots: Vec<SlotState>,
    /// Held ranges, ordered by start slot.
    pub held: Vec<HeldRange>,
}

impl BankSnapshot {
    pub fn occupied_slots(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| **s == SlotState::Occupied)
            .count()
    }

    /// Returns the requester occupying `slot`, if any.
    pub fn owner_of(&self, slot: usize) -> Option<RequesterId> {
        self.held
            .iter()
            .find(|h| h.handle.contains_slot(slot))
            .map(|h| h.requester)
    }

    /// Checks the bank invariant: handles lie inside the bank, do not
    /// overlap, cover only occupied slots, and cover every occupied slot.
    pub fn verify(&self) -> Result<(), BankError> {
        if self.slots.len() != self.capacity {
            return Err(BankError::Corrupted(format!(
                "bank {}: bitmap has {} slots, capacity is {}",
                self.index,
                self.slots.len(),
                self.capacity
            )));
        }

        let mut covered = 0;
        let mut previous: Option<&HeldRange> = None;
        for held in &self.held {
            let h = held.handle;
            if h.bank != self.index || h.end >= self.capacity || h.start > h.end {
                return Err(BankError::Corrupted(format!(
                    "bank {}: handle {h} of {} is out of bounds",
                    self.index, held.requester
                )));
            }
            if let Some(prev) = previous {
                if prev.handle.overlaps(&h) {
                    return Err(BankError::Corrupted(format!(
                        "bank {}: {} and {} overlap",
                        self.index, prev.requester, held.requester
                    )));
                }
            }
            if self.slots[h.slots()].iter().any(|s| *s != SlotState::Occupied) {
                return Err(BankError::Corrupted(format!(
                    "bank {}: handle {h} of {} covers a free slot",
                    self.index, held.requester
                )));
            }
            covered += h.len();
            previous = Some(held);
        }

        let occupied = self.occupied_slots();
        if covered != occupied {
            return Err(BankError::Corrupted(format!(
                "bank {}: {occupied} occupied slots but handles cover {covered}",
                self.index
            )));
        }
        Ok(())
    }

    /// Renders the bitmap as a bar, e.g. `[##.#..]`.
    pub fn render(&self) -> String {
        let body: String = self
            .slots
            .iter()
            .map(|s| match s {
                SlotState::Free => '.',
                SlotState::Occupied => '#',
            })
            .collect();
        format!("[{body}]")
    }
}
