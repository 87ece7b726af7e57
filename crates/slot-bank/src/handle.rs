// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The contiguous slot range owned by one active allocation.

use std::fmt;
use std::ops::RangeInclusive;

/// A contiguous, inclusive range of slots held by one requester on one bank.
///
/// Handles are owned by the [`SlotBank`](crate::SlotBank) that created them.
/// Values returned to callers are copies for display and inspection only;
/// releasing always goes through the requester's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AllocationHandle {
    /// Index of the owning bank within its group.
    pub bank: usize,
    /// First slot of the range.
    pub start: usize,
    /// Last slot of the range (inclusive).
    pub end: usize,
}

impl AllocationHandle {
    pub(crate) fn new(bank: usize, start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { bank, start, end }
    }

    /// Number of slots covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// A handle always covers at least one slot.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn slots(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn contains_slot(&self, slot: usize) -> bool {
        self.slots().contains(&slot)
    }

    /// Returns `true` if both handles are on the same bank and share a slot.
    pub fn overlaps(&self, other: &AllocationHandle) -> bool {
        self.bank == other.bank && self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for AllocationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bank {} [{}..={}]", self.bank, self.start, self.end)
    }
}
