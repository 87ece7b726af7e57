// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The occupancy ledger: when did each requester start occupying?
//!
//! [`MeteringLedger`] maps requester identity to the timestamp its
//! occupancy began. `begin` and `end` on one identity are atomic with
//! respect to each other: both run under the ledger lock, and `begin`
//! only inserts into a vacant entry.
//!
//! The ledger never charges anyone. It reports the elapsed time and the
//! caller prices it with a [`Tariff`](crate::Tariff).

use crate::{MeteringError, Timestamp};
use slot_bank::RequesterId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A closed occupancy, returned by [`MeteringLedger::end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Occupancy {
    pub requester: RequesterId,
    pub started: Timestamp,
    pub ended: Timestamp,
}

impl Occupancy {
    /// Elapsed time, saturating to zero if the clock went backwards.
    pub fn elapsed(&self) -> Duration {
        self.ended.since(self.started)
    }
}

/// Records the start time of every open occupancy.
///
/// # Example
/// ```
/// use metering::{MeteringLedger, Timestamp};
/// use slot_bank::RequesterId;
/// use std::time::Duration;
///
/// let ledger = MeteringLedger::new();
/// ledger.begin(RequesterId(1), Timestamp::from_hours(9)).unwrap();
///
/// let closed = ledger.end(RequesterId(1), Timestamp::from_hours(12)).unwrap().unwrap();
/// assert_eq!(closed.elapsed(), Duration::from_secs(3 * 3600));
///
/// // Nothing left to end.
/// assert!(ledger.end(RequesterId(1), Timestamp::from_hours(13)).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MeteringLedger {
    open: Mutex<HashMap<RequesterId, Timestamp>>,
}

impl MeteringLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an occupancy for `requester` starting at `now`.
    ///
    /// Fails with `AlreadyOpen` if one is already open; the existing entry
    /// is kept as is.
    pub fn begin(&self, requester: RequesterId, now: Timestamp) -> Result<(), MeteringError> {
        match self.lock()?.entry(requester) {
            Entry::Occupied(existing) => Err(MeteringError::AlreadyOpen {
                requester,
                since: *existing.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(now);
                tracing::trace!(%requester, %now, "occupancy opened");
                Ok(())
            }
        }
    }

    /// Closes the occupancy for `requester` at `now`.
    ///
    /// Returns `Ok(None)` if there is no open occupancy.
    pub fn end(
        &self,
        requester: RequesterId,
        now: Timestamp,
    ) -> Result<Option<Occupancy>, MeteringError> {
        let started = self.lock()?.remove(&requester);
        Ok(started.map(|started| {
            tracing::trace!(%requester, %started, %now, "occupancy closed");
            Occupancy {
                requester,
                started,
                ended: now,
            }
        }))
    }

    /// Drops an open occupancy without closing it, so nothing is billed.
    ///
    /// Returns `Ok(false)` if no occupancy was open.
    pub fn discard(&self, requester: RequesterId) -> Result<bool, MeteringError> {
        Ok(self.lock()?.remove(&requester).is_some())
    }

    pub fn is_open(&self, requester: RequesterId) -> Result<bool, MeteringError> {
        Ok(self.lock()?.contains_key(&requester))
    }

    pub fn started_at(&self, requester: RequesterId) -> Result<Option<Timestamp>, MeteringError> {
        Ok(self.lock()?.get(&requester).copied())
    }

    /// Number of open occupancies.
    pub fn len(&self) -> Result<usize, MeteringError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, MeteringError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RequesterId, Timestamp>>, MeteringError> {
        self.open.lock().map_err(|_| MeteringError::Poisoned)
    }
}
