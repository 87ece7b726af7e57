// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for slot allocation.

use crate::RequesterId;

/// Errors that can occur while allocating or releasing slots.
///
/// Running out of contiguous capacity is *not* an error: it is reported
/// as `Ok(None)` by the allocation calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    /// The request itself is malformed (e.g. a zero-slot unit).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requester already holds a handle in one of the banks.
    #[error("requester {requester} already holds slots {start}..={end} in bank {bank}")]
    AlreadyAllocated {
        requester: RequesterId,
        bank: usize,
        start: usize,
        end: usize,
    },

    /// A thread panicked while holding the bank lock.
    #[error("bank {0} lock poisoned")]
    Poisoned(usize),

    /// An internal bank inconsistency was detected.
    #[error("bank integrity error: {0}")]
    Corrupted(String),
}
