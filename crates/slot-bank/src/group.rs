// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! An ordered group of banks with fallback placement.
//!
//! [`BankGroup::allocate`] tries each bank in ascending index order and
//! stops at the first that accepts. Placement is therefore deterministic
//! for a given bank state and request order.
//!
//! No lock spans more than one bank: the search probes banks one at a
//! time, so concurrent requests may race for the same bank. Either one
//! wins and the other moves on to the next bank.

use crate::{AllocationHandle, BankError, BankSnapshot, BankStats, RequesterId, ResourceUnit, SlotBank};

/// An ordered collection of [`SlotBank`]s (a "garage").
#[derive(Debug)]
pub struct BankGroup {
    banks: Vec<SlotBank>,
}

impl BankGroup {
    /// Creates one bank per entry in `capacities`, in order.
    pub fn new(capacities: &[usize]) -> Self {
        let banks = capacities
            .iter()
            .enumerate()
            .map(|(index, &capacity)| SlotBank::new(index, capacity))
            .collect();
        Self { banks }
    }

    /// Creates `banks` banks of `slots_per_bank` slots each.
    pub fn uniform(banks: usize, slots_per_bank: usize) -> Self {
        Self::new(&vec![slots_per_bank; banks])
    }

    /// Places `unit` on the first bank, in index order, that can take it.
    ///
    /// Returns `Ok(None)` if every bank is too full; nothing changes then.
    /// A requester already holding a range in any bank gets
    /// `Err(AlreadyAllocated)`. The check and the placement are not one
    /// atomic step; concurrent callers must not allocate the same identity.
    pub fn allocate(
        &self,
        requester: RequesterId,
        unit: ResourceUnit,
    ) -> Result<Option<AllocationHandle>, BankError> {
        if let Some(held) = self.locate(requester)? {
            return Err(BankError::AlreadyAllocated {
                requester,
                bank: held.bank,
                start: held.start,
                end: held.end,
            });
        }
        for bank in &self.banks {
            if let Some(handle) = bank.try_allocate(requester, unit)? {
                return Ok(Some(handle));
            }
        }
        tracing::debug!(%requester, %unit, banks = self.banks.len(), "no bank can fit request");
        Ok(None)
    }

    /// Releases whatever `requester` holds, wherever it is.
    ///
    /// Returns `Ok(false)` if no bank holds the identity.
    pub fn release(&self, requester: RequesterId) -> Result<bool, BankError> {
        for bank in &self.banks {
            if bank.contains(requester)? {
                return bank.release(requester);
            }
        }
        Ok(false)
    }

    /// Returns `true` if any bank holds `requester`.
    pub fn contains(&self, requester: RequesterId) -> Result<bool, BankError> {
        Ok(self.locate(requester)?.is_some())
    }

    /// Finds the handle held by `requester`.
    pub fn locate(&self, requester: RequesterId) -> Result<Option<AllocationHandle>, BankError> {
        for bank in &self.banks {
            if let Some(handle) = bank.handle_of(requester)? {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    pub fn bank(&self, index: usize) -> Option<&SlotBank> {
        self.banks.get(index)
    }

    pub fn banks(&self) -> impl Iterator<Item = &SlotBank> {
        self.banks.iter()
    }

    pub fn total_capacity(&self) -> usize {
        self.banks.iter().map(SlotBank::capacity).sum()
    }

    pub fn occupied_slots(&self) -> Result<usize, BankError> {
        self.banks.iter().map(SlotBank::occupied_slots).sum()
    }

    /// Snapshots every bank, in index order.
    ///
    /// Each bank is copied under its own lock; the result is not a single
    /// atomic view of the whole group.
    pub fn snapshot(&self) -> Result<Vec<BankSnapshot>, BankError> {
        self.banks.iter().map(SlotBank::snapshot).collect()
    }

    /// Statistics summed over all banks.
    pub fn stats(&self) -> Result<BankStats, BankError> {
        let mut total = BankStats::default();
        for bank in &self.banks {
            total.merge(&bank.stats()?);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(size: usize) -> ResourceUnit {
        ResourceUnit::new(size).unwrap()
    }

    #[test]
    fn test_falls_back_to_next_bank() {
        let group = BankGroup::uniform(2, 2);
        let a = group.allocate(RequesterId(1), unit(2)).unwrap().unwrap();
        assert_eq!(a.bank, 0);

        let b = group.allocate(RequesterId(2), unit(1)).unwrap().unwrap();
        assert_eq!((b.bank, b.start, b.end), (1, 0, 0));
    }

    #[test]
    fn test_full_group_returns_none_without_changes() {
        let group = BankGroup::uniform(2, 2);
        group.allocate(RequesterId(1), unit(2)).unwrap().unwrap();
        group.allocate(RequesterId(2), unit(2)).unwrap().unwrap();

        let before = group.snapshot().unwrap();
        assert!(group.allocate(RequesterId(3), unit(1)).unwrap().is_none());
        assert_eq!(group.snapshot().unwrap(), before);
    }

    #[test]
    fn test_no_single_bank_large_enough() {
        // Six free slots in total, but no bank holds three in a row.
        let group = BankGroup::uniform(3, 2);
        assert!(group.allocate(RequesterId(1), unit(3)).unwrap().is_none());
    }

    #[test]
    fn test_heterogeneous_capacities() {
        let group = BankGroup::new(&[1, 4]);
        let h = group.allocate(RequesterId(1), unit(3)).unwrap().unwrap();
        assert_eq!(h.bank, 1);
        assert_eq!(group.total_capacity(), 5);
    }

    #[test]
    fn test_release_delegates_to_owner() {
        let group = BankGroup::uniform(3, 2);
        group.allocate(RequesterId(1), unit(2)).unwrap().unwrap();
        group.allocate(RequesterId(2), unit(2)).unwrap().unwrap();

        assert_eq!(group.locate(RequesterId(2)).unwrap().unwrap().bank, 1);
        assert!(group.release(RequesterId(2)).unwrap());
        assert!(!group.contains(RequesterId(2)).unwrap());
        assert_eq!(group.bank(1).unwrap().free_slots().unwrap(), 2);
        // Bank 0 is untouched.
        assert_eq!(group.bank(0).unwrap().free_slots().unwrap(), 0);
    }

    #[test]
    fn test_identity_held_in_later_bank_is_not_placed_again() {
        let group = BankGroup::new(&[1, 2]);
        group.allocate(RequesterId(9), unit(1)).unwrap().unwrap();
        let held = group.allocate(RequesterId(1), unit(1)).unwrap().unwrap();
        assert_eq!(held.bank, 1);

        // Bank 0 has room again, but #1 already holds a range in bank 1.
        assert!(group.release(RequesterId(9)).unwrap());
        let err = group.allocate(RequesterId(1), unit(1)).unwrap_err();
        assert_eq!(
            err,
            BankError::AlreadyAllocated {
                requester: RequesterId(1),
                bank: 1,
                start: 0,
                end: 0,
            }
        );

        let holders = group
            .banks()
            .filter(|b| b.contains(RequesterId(1)).unwrap())
            .count();
        assert_eq!(holders, 1);
        assert_eq!(group.bank(0).unwrap().free_slots().unwrap(), 1);
    }

    #[test]
    fn test_release_unknown() {
        let group = BankGroup::uniform(2, 2);
        assert!(!group.release(RequesterId(7)).unwrap());
    }

    #[test]
    fn test_deterministic_placement() {
        let run = || {
            let group = BankGroup::uniform(3, 4);
            (0..6u64)
                .map(|i| {
                    group
                        .allocate(RequesterId(i), unit((i % 3 + 1) as usize))
                        .unwrap()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_aggregate_stats() {
        let group = BankGroup::uniform(2, 1);
        group.allocate(RequesterId(1), unit(1)).unwrap().unwrap();
        group.allocate(RequesterId(2), unit(1)).unwrap().unwrap();
        assert!(group.allocate(RequesterId(3), unit(1)).unwrap().is_none());

        let stats = group.stats().unwrap();
        assert_eq!(stats.placements, 2);
        // Request 2 missed bank 0; request 3 missed both.
        assert_eq!(stats.capacity_misses, 3);
        assert_eq!(group.occupied_slots().unwrap(), 2);
    }
}
