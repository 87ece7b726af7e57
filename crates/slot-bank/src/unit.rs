// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Request sizing and requester identity.

use crate::BankError;
use std::fmt;
use std::num::NonZeroUsize;

/// Stable identity of a requester.
///
/// Used as the lookup key in both the bank handle maps and the metering
/// ledger. Components other than the owning bank only ever hold this key,
/// never a copy of the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequesterId(pub u64);

impl RequesterId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for RequesterId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Number of contiguous elementary slots a request needs.
///
/// Always at least one slot; a zero-sized unit cannot be constructed.
///
/// # Examples
/// ```
/// use slot_bank::ResourceUnit;
///
/// let unit = ResourceUnit::new(3).unwrap();
/// assert_eq!(unit.size(), 3);
/// assert!(ResourceUnit::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ResourceUnit {
    size: NonZeroUsize,
}

impl ResourceUnit {
    /// Creates a unit of `size` slots. Rejects zero.
    pub fn new(size: usize) -> Result<Self, BankError> {
        NonZeroUsize::new(size)
            .map(|size| Self { size })
            .ok_or_else(|| BankError::InvalidRequest("resource unit must span at least one slot".into()))
    }

    pub const fn from_nonzero(size: NonZeroUsize) -> Self {
        Self { size }
    }

    /// Returns the number of slots required.
    pub fn size(&self) -> usize {
        self.size.get()
    }
}

impl TryFrom<usize> for ResourceUnit {
    type Error = BankError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<ResourceUnit> for usize {
    fn from(unit: ResourceUnit) -> Self {
        unit.size()
    }
}

impl fmt::Display for ResourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        write!(f, "{size} slot{}", if size == 1 { "" } else { "s" })
    }
}
