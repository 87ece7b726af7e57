// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-bank allocation statistics.
//!
//! [`BankStats`] tracks how often a bank accepted or turned away requests
//! and its occupancy high-water mark. Useful when sizing banks.

/// Cumulative statistics about one bank's usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BankStats {
    /// Total number of allocation attempts against this bank.
    pub total_requests: u64,
    /// Attempts that found a contiguous run and were placed.
    pub placements: u64,
    /// Attempts that found no sufficiently long free run.
    pub capacity_misses: u64,
    /// Handles released back to the bank.
    pub releases: u64,
    /// Highest number of simultaneously occupied slots.
    pub peak_occupied_slots: usize,
}

impl BankStats {
    /// Returns placements as a fraction of requests in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if no requests have been made.
    pub fn placement_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.placements as f64 / self.total_requests as f64
    }

    pub(crate) fn record_placement(&mut self, occupied_after: usize) {
        self.total_requests += 1;
        self.placements += 1;
        if occupied_after > self.peak_occupied_slots {
            self.peak_occupied_slots = occupied_after;
        }
    }

    pub(crate) fn record_miss(&mut self) {
        self.total_requests += 1;
        self.capacity_misses += 1;
    }

    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    /// Folds another bank's counters into this one.
    ///
    /// Peaks are summed, which gives an upper bound for a whole group.
    pub fn merge(&mut self, other: &BankStats) {
        self.total_requests += other.total_requests;
        self.placements += other.placements;
        self.capacity_misses += other.capacity_misses;
        self.releases += other.releases;
        self.peak_occupied_slots += other.peak_occupied_slots;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Requests: {} total ({} placed, {} missed, {:.0}% placed), \
             {} releases, peak {} slots",
            self.total_requests,
            self.placements,
            self.capacity_misses,
            self.placement_ratio() * 100.0,
            self.releases,
            self.peak_occupied_slots,
        )
    }
}
