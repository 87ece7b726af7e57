// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the allocation service.

use crate::{Operation, RequesterState};
use metering::MeteringError;
use slot_bank::{BankError, RequesterId};

/// Errors returned by [`AllocationService`](crate::AllocationService).
///
/// The first three variants are expected outcomes a caller can act on
/// (see [`ServiceError::is_recoverable`]). Every failed call leaves the
/// service exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed input, e.g. a zero-slot resource unit.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No bank has a long enough run of free slots right now.
    #[error("no bank has {slots} contiguous free slots for requester {requester} ({banks} banks searched)")]
    CapacityUnavailable {
        requester: RequesterId,
        slots: usize,
        banks: usize,
    },

    /// The operation is not valid in the requester's current state
    /// (double park, vacate without park, or a concurrent operation on
    /// the same requester).
    #[error("cannot {operation} requester {requester}: it is {state}")]
    InvalidTransition {
        requester: RequesterId,
        state: RequesterState,
        operation: Operation,
    },

    /// A bank reported a failure.
    #[error("bank error: {0}")]
    Bank(#[source] BankError),

    /// The ledger or tariff reported a failure.
    #[error("metering error: {0}")]
    Metering(#[from] MeteringError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Banks and ledger disagree about a requester. Indicates a bug.
    #[error("inconsistent allocation state: {0}")]
    Inconsistent(String),
}

impl ServiceError {
    /// `true` for outcomes that are part of normal operation rather than
    /// faults: capacity exhaustion, wrong-state calls and bad input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::CapacityUnavailable { .. } | Self::InvalidTransition { .. }
        )
    }
}

impl From<BankError> for ServiceError {
    fn from(err: BankError) -> Self {
        match err {
            BankError::InvalidRequest(detail) => Self::InvalidRequest(detail),
            other => Self::Bank(other),
        }
    }
}
