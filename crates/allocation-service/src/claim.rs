// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-requester operation claims.
//!
//! A [`ClaimGuard`] marks a requester as mid-operation for as long as it
//! lives. A second park or vacate for the same requester sees the claim
//! and is rejected instead of interleaving with the first.

use crate::ServiceError;
use slot_bank::RequesterId;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub(crate) struct ClaimSet {
    active: Mutex<HashSet<RequesterId>>,
}

impl ClaimSet {
    /// Claims `requester`, or returns `None` if another operation holds it.
    pub(crate) fn try_claim(
        &self,
        requester: RequesterId,
    ) -> Result<Option<ClaimGuard<'_>>, ServiceError> {
        if !self.lock()?.insert(requester) {
            return Ok(None);
        }
        Ok(Some(ClaimGuard {
            set: self,
            requester,
        }))
    }

    pub(crate) fn is_claimed(&self, requester: RequesterId) -> Result<bool, ServiceError> {
        Ok(self.lock()?.contains(&requester))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashSet<RequesterId>>, ServiceError> {
        self.active
            .lock()
            .map_err(|_| ServiceError::Inconsistent("claim set lock poisoned".into()))
    }
}

/// RAII claim on one requester. Dropping it releases the claim.
#[must_use = "the claim is released as soon as the guard is dropped"]
pub(crate) struct ClaimGuard<'a> {
    set: &'a ClaimSet,
    requester: RequesterId,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        let mut active = match self.set.active.lock() {
            Ok(active) => active,
            Err(poisoned) => poisoned.into_inner(),
        };
        active.remove(&self.requester);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let set = ClaimSet::default();
        let id = RequesterId(1);
        let guard = set.try_claim(id).unwrap().expect("first claim");
        assert!(set.is_claimed(id).unwrap());
        assert!(set.try_claim(id).unwrap().is_none());
        assert!(set.try_claim(RequesterId(2)).unwrap().is_some());
        drop(guard);
        assert!(!set.is_claimed(id).unwrap());
        assert!(set.try_claim(id).unwrap().is_some());
    }
}
