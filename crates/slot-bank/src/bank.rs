// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A single fixed-capacity bank of slots with first-fit placement.
//!
//! A [`SlotBank`] owns:
//!
//! 1. A slot bitmap (`Free` / `Occupied`) of fixed length.
//! 2. The map from requester identity to the [`AllocationHandle`] it holds.
//! 3. Placement statistics.
//!
//! All three live behind one `Mutex`, so allocate, release and lookup on a
//! bank never interleave. Different banks lock independently.
//!
//! # Invariant
//! Every slot inside a recorded handle is `Occupied`, recorded handles
//! never overlap, and every `Occupied` slot belongs to exactly one handle.
//! [`BankSnapshot::verify`](crate::BankSnapshot::verify) checks this.

use crate::snapshot::{BankSnapshot, HeldRange};
use crate::{AllocationHandle, BankError, BankStats, RequesterId, ResourceUnit};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// State of one elementary slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Free,
    Occupied,
}

/// Lock-protected interior of a bank.
struct BankState {
    slots: Vec<SlotState>,
    handles: HashMap<RequesterId, AllocationHandle>,
    occupied: usize,
    stats: BankStats,
}

/// One linear bank of slots (a "floor").
///
/// # Example
/// ```
/// use slot_bank::{RequesterId, ResourceUnit, SlotBank};
///
/// let bank = SlotBank::new(0, 4);
/// let handle = bank
///     .try_allocate(RequesterId(1), ResourceUnit::new(3).unwrap())
///     .unwrap()
///     .expect("bank is empty");
/// assert_eq!((handle.start, handle.end), (0, 2));
///
/// // Only one slot left: a two-slot request does not fit.
/// let miss = bank.try_allocate(RequesterId(2), ResourceUnit::new(2).unwrap()).unwrap();
/// assert!(miss.is_none());
///
/// assert!(bank.release(RequesterId(1)).unwrap());
/// assert_eq!(bank.free_slots().unwrap(), 4);
/// ```
pub struct SlotBank {
    index: usize,
    capacity: usize,
    state: Mutex<BankState>,
}

impl SlotBank {
    /// Creates an empty bank with `capacity` slots.
    ///
    /// `index` identifies the bank inside its group and is stamped on every
    /// handle it issues.
    pub fn new(index: usize, capacity: usize) -> Self {
        Self {
            index,
            capacity,
            state: Mutex::new(BankState {
                slots: vec![SlotState::Free; capacity],
                handles: HashMap::new(),
                occupied: 0,
                stats: BankStats::default(),
            }),
        }
    }

    /// Tries to place `unit` on the earliest contiguous free run.
    ///
    /// Returns `Ok(None)` if no run is long enough; the bank is left
    /// untouched in that case. A requester already holding slots here
    /// gets `Err(AlreadyAllocated)`.
    ///
    /// First-fit, not best-fit: the earliest-starting window wins even
    /// if a tighter gap exists further right. O(capacity).
    pub fn try_allocate(
        &self,
        requester: RequesterId,
        unit: ResourceUnit,
    ) -> Result<Option<AllocationHandle>, BankError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if let Some(held) = state.handles.get(&requester) {
            return Err(BankError::AlreadyAllocated {
                requester,
                bank: self.index,
                start: held.start,
                end: held.end,
            });
        }

        let size = unit.size();
        let start = if size > self.capacity - state.occupied {
            None
        } else {
            first_fit(&state.slots, size)
        };

        let Some(start) = start else {
            state.stats.record_miss();
            tracing::trace!(bank = self.index, %requester, size, "no contiguous run");
            return Ok(None);
        };

        let handle = AllocationHandle::new(self.index, start, start + size - 1);
        state.slots[handle.slots()].fill(SlotState::Occupied);
        state.occupied += size;
        state.handles.insert(requester, handle);
        state.stats.record_placement(state.occupied);

        tracing::debug!(%requester, %handle, "slots allocated");
        Ok(Some(handle))
    }

    /// Frees the slots held by `requester`.
    ///
    /// Returns `Ok(false)` if the requester holds nothing here; releasing
    /// twice is a no-op rather than an error.
    pub fn release(&self, requester: RequesterId) -> Result<bool, BankError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let Some(&handle) = state.handles.get(&requester) else {
            return Ok(false);
        };

        let range = &mut state.slots[handle.slots()];
        if range.iter().any(|s| *s != SlotState::Occupied) {
            return Err(BankError::Corrupted(format!(
                "handle {handle} of requester {requester} covers a free slot"
            )));
        }
        range.fill(SlotState::Free);
        state.occupied -= handle.len();
        state.handles.remove(&requester);
        state.stats.record_release();

        tracing::debug!(%requester, %handle, "slots released");
        Ok(true)
    }

    /// Returns `true` if `requester` holds a handle in this bank.
    pub fn contains(&self, requester: RequesterId) -> Result<bool, BankError> {
        Ok(self.lock()?.handles.contains_key(&requester))
    }

    /// Returns a copy of the handle held by `requester`, if any.
    pub fn handle_of(&self, requester: RequesterId) -> Result<Option<AllocationHandle>, BankError> {
        Ok(self.lock()?.handles.get(&requester).copied())
    }

    /// Position of this bank within its group.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupied_slots(&self) -> Result<usize, BankError> {
        Ok(self.lock()?.occupied)
    }

    pub fn free_slots(&self) -> Result<usize, BankError> {
        Ok(self.capacity - self.lock()?.occupied)
    }

    /// Length of the longest run of consecutive free slots.
    pub fn largest_free_run(&self) -> Result<usize, BankError> {
        let state = self.lock()?;
        let mut best = 0;
        let mut run = 0;
        for slot in &state.slots {
            if *slot == SlotState::Free {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        Ok(best)
    }

    /// Returns a copy of the slot bitmap.
    pub fn slot_states(&self) -> Result<Vec<SlotState>, BankError> {
        Ok(self.lock()?.slots.clone())
    }

    /// Takes a consistent point-in-time copy of the bank.
    pub fn snapshot(&self) -> Result<BankSnapshot, BankError> {
        let state = self.lock()?;
        let mut held: Vec<HeldRange> = state
            .handles
            .iter()
            .map(|(&requester, &handle)| HeldRange { requester, handle })
            .collect();
        held.sort_by_key(|h| h.handle.start);
        Ok(BankSnapshot {
            index: self.index,
            capacity: self.capacity,
            slots: state.slots.clone(),
            held,
        })
    }

    /// Returns a copy of the bank's statistics.
    pub fn stats(&self) -> Result<BankStats, BankError> {
        Ok(self.lock()?.stats.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BankState>, BankError> {
        self.state.lock().map_err(|_| BankError::Poisoned(self.index))
    }
}

impl std::fmt::Debug for SlotBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotBank")
            .field("index", &self.index)
            .field("capacity", &self.capacity)
            .field("occupied", &self.occupied_slots().ok())
            .finish()
    }
}

/// Sliding-window search for the first run of `size` free slots.
///
/// Keeps a candidate window `[left, right]` of free slots; an occupied
/// slot restarts the window just past it.
fn first_fit(slots: &[SlotState], size: usize) -> Option<usize> {
    let mut left = 0;
    for (right, slot) in slots.iter().enumerate() {
        if *slot == SlotState::Occupied {
            left = right + 1;
            continue;
        }
        if right + 1 - left == size {
            return Some(left);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(size: usize) -> ResourceUnit {
        ResourceUnit::new(size).unwrap()
    }

    #[test]
    fn test_first_fit_skips_occupied_prefix() {
        let bank = SlotBank::new(0, 10);
        bank.try_allocate(RequesterId(1), unit(3)).unwrap().unwrap();

        let h = bank.try_allocate(RequesterId(2), unit(3)).unwrap().unwrap();
        assert_eq!((h.start, h.end), (3, 5));
    }

    #[test]
    fn test_first_fit_not_best_fit() {
        // Layout after setup: [A A . . . B . .]
        let bank = SlotBank::new(0, 8);
        bank.try_allocate(RequesterId(1), unit(2)).unwrap().unwrap();
        bank.try_allocate(RequesterId(9), unit(3)).unwrap().unwrap();
        bank.try_allocate(RequesterId(2), unit(1)).unwrap().unwrap();
        bank.release(RequesterId(9)).unwrap();

        // The tighter gap is 6..=7, but first-fit takes the earliest one.
        let h = bank.try_allocate(RequesterId(3), unit(1)).unwrap().unwrap();
        assert_eq!(h.start, 2);
    }

    #[test]
    fn test_miss_leaves_no_side_effects() {
        let bank = SlotBank::new(0, 4);
        bank.try_allocate(RequesterId(1), unit(1)).unwrap().unwrap();
        bank.try_allocate(RequesterId(2), unit(1)).unwrap().unwrap();
        bank.release(RequesterId(1)).unwrap();
        // Layout: [. B . .]: three free slots but no run of three.
        let before = bank.slot_states().unwrap();

        assert!(bank.try_allocate(RequesterId(3), unit(3)).unwrap().is_none());
        assert_eq!(bank.slot_states().unwrap(), before);
        assert!(!bank.contains(RequesterId(3)).unwrap());
        assert_eq!(bank.stats().unwrap().capacity_misses, 1);
    }

    #[test]
    fn test_oversized_request_misses() {
        let bank = SlotBank::new(0, 2);
        assert!(bank.try_allocate(RequesterId(1), unit(3)).unwrap().is_none());
        assert_eq!(bank.free_slots().unwrap(), 2);
    }

    #[test]
    fn test_exact_fill() {
        let bank = SlotBank::new(0, 3);
        let h = bank.try_allocate(RequesterId(1), unit(3)).unwrap().unwrap();
        assert_eq!((h.start, h.end), (0, 2));
        assert_eq!(bank.free_slots().unwrap(), 0);
        assert!(bank.try_allocate(RequesterId(2), unit(1)).unwrap().is_none());
    }

    #[test]
    fn test_release_exact_range() {
        let bank = SlotBank::new(0, 6);
        bank.try_allocate(RequesterId(1), unit(2)).unwrap().unwrap();
        bank.try_allocate(RequesterId(2), unit(3)).unwrap().unwrap();
        bank.try_allocate(RequesterId(3), unit(1)).unwrap().unwrap();

        assert!(bank.release(RequesterId(2)).unwrap());

        use SlotState::{Free as F, Occupied as O};
        assert_eq!(bank.slot_states().unwrap(), vec![O, O, F, F, F, O]);
        assert_eq!(
            bank.handle_of(RequesterId(1)).unwrap(),
            Some(AllocationHandle::new(0, 0, 1))
        );
        assert_eq!(
            bank.handle_of(RequesterId(3)).unwrap(),
            Some(AllocationHandle::new(0, 5, 5))
        );
    }

    #[test]
    fn test_release_unknown_is_noop() {
        let bank = SlotBank::new(0, 2);
        assert!(!bank.release(RequesterId(42)).unwrap());

        bank.try_allocate(RequesterId(1), unit(1)).unwrap().unwrap();
        assert!(bank.release(RequesterId(1)).unwrap());
        assert!(!bank.release(RequesterId(1)).unwrap());
        assert_eq!(bank.stats().unwrap().releases, 1);
    }

    #[test]
    fn test_duplicate_requester_rejected() {
        let bank = SlotBank::new(2, 4);
        bank.try_allocate(RequesterId(1), unit(1)).unwrap().unwrap();
        let err = bank.try_allocate(RequesterId(1), unit(1)).unwrap_err();
        assert_eq!(
            err,
            BankError::AlreadyAllocated {
                requester: RequesterId(1),
                bank: 2,
                start: 0,
                end: 0,
            }
        );
        assert_eq!(bank.occupied_slots().unwrap(), 1);
    }

    #[test]
    fn test_largest_free_run() {
        let bank = SlotBank::new(0, 7);
        assert_eq!(bank.largest_free_run().unwrap(), 7);
        bank.try_allocate(RequesterId(1), unit(2)).unwrap().unwrap();
        bank.try_allocate(RequesterId(2), unit(1)).unwrap().unwrap();
        bank.release(RequesterId(1)).unwrap();
        // [. . B . . . .]
        assert_eq!(bank.largest_free_run().unwrap(), 4);
    }

    #[test]
    fn test_zero_capacity_bank() {
        let bank = SlotBank::new(0, 0);
        assert!(bank.try_allocate(RequesterId(1), unit(1)).unwrap().is_none());
        assert_eq!(bank.largest_free_run().unwrap(), 0);
    }

    #[test]
    fn test_first_fit_helper() {
        use SlotState::{Free as F, Occupied as O};
        assert_eq!(first_fit(&[O, O, O, F, F, F, F], 3), Some(3));
        assert_eq!(first_fit(&[F, O, F, F, O, F, F, F], 3), Some(5));
        assert_eq!(first_fit(&[F, O, F], 2), None);
        assert_eq!(first_fit(&[], 1), None);
    }

    #[test]
    fn test_stats_peak() {
        let bank = SlotBank::new(0, 5);
        bank.try_allocate(RequesterId(1), unit(2)).unwrap().unwrap();
        bank.try_allocate(RequesterId(2), unit(3)).unwrap().unwrap();
        bank.release(RequesterId(1)).unwrap();
        bank.release(RequesterId(2)).unwrap();

        let stats = bank.stats().unwrap();
        assert_eq!(stats.peak_occupied_slots, 5);
        assert_eq!(stats.placements, 2);
        assert_eq!(stats.releases, 2);
    }

    #[test]
    fn test_concurrent_allocations_do_not_overlap() {
        let bank = SlotBank::new(0, 64);
        std::thread::scope(|scope| {
            for t in 0..8u64 {
                let bank = &bank;
                scope.spawn(move || {
                    for i in 0..4u64 {
                        let id = RequesterId(t * 100 + i);
                        bank.try_allocate(id, unit(2)).unwrap();
                    }
                });
            }
        });

        let snap = bank.snapshot().unwrap();
        snap.verify().unwrap();
        assert_eq!(snap.held.len(), 32);
        assert_eq!(bank.free_slots().unwrap(), 0);
    }

    #[test]
    fn test_debug_format() {
        let debug = format!("{:?}", SlotBank::new(3, 8));
        assert!(debug.contains("SlotBank"));
        assert!(debug.contains("capacity"));
    }
}
