// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for metering and billing.

use crate::Timestamp;
use slot_bank::RequesterId;

/// Errors that can occur while recording occupancy or building a tariff.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeteringError {
    /// `begin` was called for a requester whose occupancy is already open.
    #[error("occupancy for requester {requester} already open since {since}")]
    AlreadyOpen {
        requester: RequesterId,
        since: Timestamp,
    },

    /// A billing period string could not be parsed or was zero.
    #[error("invalid billing period: {0}")]
    InvalidPeriod(String),

    /// Unknown rounding policy name.
    #[error("unknown rounding policy '{0}'; expected 'ceil' or 'ceil-min-one'")]
    InvalidRounding(String),

    /// A thread panicked while holding the ledger lock.
    #[error("ledger lock poisoned")]
    Poisoned,
}
