// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Service-level counters.

/// Counters for the operations an [`AllocationService`](crate::AllocationService)
/// has performed.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ServiceMetrics {
    /// Successful parks.
    pub parks: u64,
    /// Successful vacates.
    pub vacates: u64,
    /// Parks rejected for lack of capacity.
    pub capacity_misses: u64,
    /// Calls rejected as invalid transitions.
    pub rejected_transitions: u64,
    /// Sum of all amounts charged.
    pub total_billed: u64,
}

impl ServiceMetrics {
    /// Requesters currently parked according to the counters.
    pub fn active(&self) -> u64 {
        self.parks.saturating_sub(self.vacates)
    }

    pub fn summary(&self) -> String {
        format!(
            "Parks: {}, vacates: {}, active: {}, capacity misses: {}, rejected: {}, billed: {}",
            self.parks,
            self.vacates,
            self.active(),
            self.capacity_misses,
            self.rejected_transitions,
            self.total_billed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let m = ServiceMetrics {
            parks: 4,
            vacates: 1,
            capacity_misses: 2,
            rejected_transitions: 1,
            total_billed: 15,
        };
        assert_eq!(m.active(), 3);
        assert_eq!(
            m.summary(),
            "Parks: 4, vacates: 1, active: 3, capacity misses: 2, rejected: 1, billed: 15"
        );
    }
}
