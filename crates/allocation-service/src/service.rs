// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! [`AllocationService`]: the park/vacate coordinator.
//!
//! A park places the requester's unit in the first bank that fits, then
//! opens its occupancy in the ledger. A vacate closes the occupancy,
//! releases the range and charges the requester. Each step either
//! completes fully or leaves no trace.

use crate::claim::{ClaimGuard, ClaimSet};
use crate::{Requester, ServiceConfig, ServiceError, ServiceMetrics};
use metering::{Clock, MeteringLedger, MonotonicClock, Occupancy, Tariff};
use slot_bank::{AllocationHandle, BankError, BankGroup, BankSnapshot, BankStats, RequesterId};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Where a requester is in its park/vacate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequesterState {
    /// Holds no slots.
    Unallocated,
    /// Holds a range and has an open occupancy.
    Parked,
    /// A park or vacate is in progress.
    Transitioning,
}

impl fmt::Display for RequesterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unallocated => "unallocated",
            Self::Parked => "parked",
            Self::Transitioning => "transitioning",
        })
    }
}

/// The two state-changing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Park,
    Vacate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Park => "park",
            Self::Vacate => "vacate",
        })
    }
}

/// Outcome of a successful vacate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VacateReceipt {
    pub requester: RequesterId,
    /// The range that was released.
    pub handle: AllocationHandle,
    pub occupancy: Occupancy,
    /// Billing periods charged after rounding.
    pub billed_units: u64,
    /// Amount added to the requester's balance.
    pub amount: u64,
}

impl VacateReceipt {
    pub fn elapsed(&self) -> Duration {
        self.occupancy.elapsed()
    }
}

/// Coordinates banks, the metering ledger and billing.
///
/// All methods take `&self`; the service is meant to be shared behind an
/// `Arc` by concurrent callers. Operations on different requesters run in
/// parallel. Operations on the same requester never interleave: the second
/// one is rejected with [`ServiceError::InvalidTransition`].
pub struct AllocationService {
    group: BankGroup,
    ledger: MeteringLedger,
    tariff: Tariff,
    charge_per_slot: bool,
    clock: Box<dyn Clock>,
    claims: ClaimSet,
    metrics: Mutex<ServiceMetrics>,
}

impl AllocationService {
    /// Builds a service timed by a [`MonotonicClock`].
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Builds a service that reads time from `clock`.
    pub fn with_clock(
        config: &ServiceConfig,
        clock: impl Clock + 'static,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let capacities = config.resolve_capacities();
        let tariff = config.tariff()?;

        tracing::info!(
            banks = capacities.len(),
            total_slots = capacities.iter().sum::<usize>(),
            rate = tariff.rate,
            period = %tariff.period,
            rounding = %tariff.rounding,
            charge_per_slot = config.charge_per_slot,
            "allocation service ready"
        );

        Ok(Self {
            group: BankGroup::new(&capacities),
            ledger: MeteringLedger::new(),
            tariff,
            charge_per_slot: config.charge_per_slot,
            clock: Box::new(clock),
            claims: ClaimSet::default(),
            metrics: Mutex::new(ServiceMetrics::default()),
        })
    }

    /// Places `requester`'s unit in the first bank with a long enough free
    /// run and starts metering it.
    ///
    /// # Errors
    /// - [`ServiceError::InvalidTransition`] if the requester is already
    ///   parked or has another operation in flight.
    /// - [`ServiceError::CapacityUnavailable`] if no bank fits the unit.
    ///   Nothing is changed.
    pub fn park(&self, requester: &Requester) -> Result<AllocationHandle, ServiceError> {
        let id = requester.id();
        let _claim = self.claim(id, Operation::Park)?;

        if self.ledger.is_open(id)? || self.group.contains(id)? {
            return Err(self.reject(id, RequesterState::Parked, Operation::Park));
        }

        let unit = requester.unit();
        let Some(handle) = self.group.allocate(id, unit)? else {
            tracing::warn!(requester = %id, slots = unit.size(), "no bank can fit requester");
            self.record(|m| m.capacity_misses += 1);
            return Err(ServiceError::CapacityUnavailable {
                requester: id,
                slots: unit.size(),
                banks: self.group.len(),
            });
        };

        let now = self.clock.now();
        if let Err(err) = self.ledger.begin(id, now) {
            // Undo the placement so a failed park leaves no trace.
            self.group.release(id)?;
            return Err(err.into());
        }

        self.record(|m| m.parks += 1);
        tracing::debug!(requester = %id, %handle, at = %now, "parked");
        Ok(handle)
    }

    /// Ends `requester`'s occupancy, frees its range and charges it.
    ///
    /// The range is released before the balance changes, so a failure
    /// never leaves a charge without a matching release.
    ///
    /// # Errors
    /// [`ServiceError::InvalidTransition`] if the requester is not parked
    /// or has another operation in flight. The balance is untouched.
    pub fn vacate(&self, requester: &mut Requester) -> Result<VacateReceipt, ServiceError> {
        let id = requester.id();
        let _claim = self.claim(id, Operation::Vacate)?;

        let Some(handle) = self.group.locate(id)? else {
            if self.ledger.is_open(id)? {
                return Err(ServiceError::Inconsistent(format!(
                    "requester {id} has an open occupancy but holds no slots"
                )));
            }
            return Err(self.reject(id, RequesterState::Unallocated, Operation::Vacate));
        };

        let Some(occupancy) = self.ledger.end(id, self.clock.now())? else {
            return Err(ServiceError::Inconsistent(format!(
                "requester {id} holds {handle} without an open occupancy"
            )));
        };

        let released = self.group.release(id);
        self.settle_release(&occupancy, handle, released)?;

        let billed_units = self.tariff.billable_units(occupancy.elapsed());
        let multiplier = if self.charge_per_slot {
            handle.len() as u64
        } else {
            1
        };
        let amount = self.tariff.price_units(billed_units, multiplier);
        requester.charge(amount);

        self.record(|m| {
            m.vacates += 1;
            m.total_billed = m.total_billed.saturating_add(amount);
        });
        tracing::debug!(
            requester = %id,
            %handle,
            elapsed_ms = occupancy.elapsed().as_millis() as u64,
            billed_units,
            amount,
            "vacated"
        );

        Ok(VacateReceipt {
            requester: id,
            handle,
            occupancy,
            billed_units,
            amount,
        })
    }

    /// Current lifecycle state of `requester`.
    pub fn state_of(&self, requester: RequesterId) -> Result<RequesterState, ServiceError> {
        if self.claims.is_claimed(requester)? {
            Ok(RequesterState::Transitioning)
        } else if self.ledger.is_open(requester)? {
            Ok(RequesterState::Parked)
        } else {
            Ok(RequesterState::Unallocated)
        }
    }

    /// Range currently held by `requester`, if any.
    pub fn placement(&self, requester: RequesterId) -> Result<Option<AllocationHandle>, ServiceError> {
        Ok(self.group.locate(requester)?)
    }

    /// Point-in-time snapshot of every bank, in bank order.
    pub fn snapshot(&self) -> Result<Vec<BankSnapshot>, ServiceError> {
        Ok(self.group.snapshot()?)
    }

    /// Bank statistics merged across all banks.
    pub fn bank_stats(&self) -> Result<BankStats, ServiceError> {
        Ok(self.group.stats()?)
    }

    pub fn metrics(&self) -> ServiceMetrics {
        match self.metrics.lock() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of open occupancies.
    pub fn parked_count(&self) -> Result<usize, ServiceError> {
        Ok(self.ledger.len()?)
    }

    pub fn tariff(&self) -> &Tariff {
        &self.tariff
    }

    pub fn bank_count(&self) -> usize {
        self.group.len()
    }

    pub fn total_capacity(&self) -> usize {
        self.group.total_capacity()
    }

    /// Checks the outcome of a vacate's release. On failure the occupancy
    /// is reopened with its original start, so the requester stays parked
    /// and unbilled.
    fn settle_release(
        &self,
        occupancy: &Occupancy,
        handle: AllocationHandle,
        released: Result<bool, BankError>,
    ) -> Result<(), ServiceError> {
        let id = occupancy.requester;
        let err = match released {
            Ok(true) => return Ok(()),
            Ok(false) => {
                tracing::error!(requester = %id, %handle, "range vanished during vacate");
                ServiceError::Inconsistent(format!("requester {id} lost {handle} during vacate"))
            }
            Err(e) => {
                tracing::error!(requester = %id, %handle, error = %e, "release failed during vacate");
                e.into()
            }
        };
        self.ledger.begin(id, occupancy.started)?;
        Err(err)
    }

    fn claim(&self, id: RequesterId, operation: Operation) -> Result<ClaimGuard<'_>, ServiceError> {
        match self.claims.try_claim(id)? {
            Some(guard) => Ok(guard),
            None => Err(self.reject(id, RequesterState::Transitioning, operation)),
        }
    }

    fn reject(&self, id: RequesterId, state: RequesterState, operation: Operation) -> ServiceError {
        tracing::warn!(requester = %id, %state, %operation, "rejected transition");
        self.record(|m| m.rejected_transitions += 1);
        ServiceError::InvalidTransition {
            requester: id,
            state,
            operation,
        }
    }

    fn record(&self, update: impl FnOnce(&mut ServiceMetrics)) {
        if let Ok(mut metrics) = self.metrics.lock() {
            update(&mut metrics);
        }
    }
}

impl fmt::Debug for AllocationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationService")
            .field("banks", &self.group.len())
            .field("total_capacity", &self.group.total_capacity())
            .field("tariff", &self.tariff)
            .field("charge_per_slot", &self.charge_per_slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VehicleClass;
    use metering::{ManualClock, Timestamp};

    fn service(config: &ServiceConfig) -> (AllocationService, ManualClock) {
        let clock = ManualClock::at(Timestamp::from_hours(9));
        let svc = AllocationService::with_clock(config, clock.clone()).unwrap();
        (svc, clock)
    }

    #[test]
    fn test_park_then_vacate() {
        let (svc, clock) = service(&ServiceConfig::default());
        let mut car = Requester::with_vehicle(1, VehicleClass::Car);

        let handle = svc.park(&car).unwrap();
        assert_eq!((handle.bank, handle.start, handle.end), (0, 0, 0));
        assert_eq!(svc.state_of(car.id()).unwrap(), RequesterState::Parked);
        assert_eq!(svc.placement(car.id()).unwrap(), Some(handle));

        clock.advance(Duration::from_secs(3 * 3600));
        let receipt = svc.vacate(&mut car).unwrap();
        assert_eq!(receipt.handle, handle);
        assert_eq!(receipt.billed_units, 3);
        assert_eq!(receipt.amount, 15);
        assert_eq!(car.balance_due(), 15);
        assert_eq!(svc.state_of(car.id()).unwrap(), RequesterState::Unallocated);
        assert_eq!(svc.placement(car.id()).unwrap(), None);
    }

    #[test]
    fn test_double_park_rejected() {
        let (svc, _) = service(&ServiceConfig::default());
        let car = Requester::with_vehicle(1, VehicleClass::Car);
        let first = svc.park(&car).unwrap();

        let err = svc.park(&car).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidTransition {
                state: RequesterState::Parked,
                operation: Operation::Park,
                ..
            }
        ));
        assert_eq!(svc.placement(car.id()).unwrap(), Some(first));
        assert_eq!(svc.parked_count().unwrap(), 1);
    }

    #[test]
    fn test_vacate_without_park() {
        let (svc, _) = service(&ServiceConfig::default());
        let mut car = Requester::with_vehicle(1, VehicleClass::Car);
        let err = svc.vacate(&mut car).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(car.balance_due(), 0);
        assert_eq!(svc.metrics().rejected_transitions, 1);
    }

    #[test]
    fn test_capacity_miss_records_metric() {
        let (svc, _) = service(&ServiceConfig::default());
        let truck = Requester::with_vehicle(1, VehicleClass::SemiTruck);
        let err = svc.park(&truck).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::CapacityUnavailable {
                slots: 3,
                banks: 3,
                ..
            }
        ));
        assert_eq!(svc.metrics().capacity_misses, 1);
        assert_eq!(svc.state_of(truck.id()).unwrap(), RequesterState::Unallocated);
    }

    #[test]
    fn test_claimed_requester_is_transitioning() {
        let (svc, _) = service(&ServiceConfig::default());
        let mut car = Requester::with_vehicle(1, VehicleClass::Car);
        let _guard = svc.claims.try_claim(car.id()).unwrap().unwrap();

        assert_eq!(svc.state_of(car.id()).unwrap(), RequesterState::Transitioning);
        let err = svc.park(&car).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidTransition {
                state: RequesterState::Transitioning,
                ..
            }
        ));
        assert!(svc.vacate(&mut car).is_err());
        assert_eq!(svc.placement(car.id()).unwrap(), None);
    }

    #[test]
    fn test_failed_release_reopens_occupancy() {
        let (svc, clock) = service(&ServiceConfig::default());
        let mut car = Requester::with_vehicle(1, VehicleClass::Car);
        let handle = svc.park(&car).unwrap();

        clock.advance(Duration::from_secs(3600));
        let occupancy = svc.ledger.end(car.id(), clock.now()).unwrap().unwrap();
        let err = svc
            .settle_release(&occupancy, handle, Err(BankError::Poisoned(0)))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Bank(BankError::Poisoned(0))));
        assert_eq!(
            svc.ledger.started_at(car.id()).unwrap(),
            Some(Timestamp::from_hours(9))
        );
        assert_eq!(svc.state_of(car.id()).unwrap(), RequesterState::Parked);
        assert_eq!(car.balance_due(), 0);

        // The requester can still leave, billed from the original start.
        clock.advance(Duration::from_secs(3600));
        let receipt = svc.vacate(&mut car).unwrap();
        assert_eq!(receipt.billed_units, 2);
        assert_eq!(car.balance_due(), 10);
    }

    #[test]
    fn test_vanished_range_reopens_occupancy() {
        let (svc, clock) = service(&ServiceConfig::default());
        let car = Requester::with_vehicle(1, VehicleClass::Car);
        let handle = svc.park(&car).unwrap();

        let occupancy = svc.ledger.end(car.id(), clock.now()).unwrap().unwrap();
        let err = svc.settle_release(&occupancy, handle, Ok(false)).unwrap_err();
        assert!(matches!(err, ServiceError::Inconsistent(_)));
        assert!(svc.ledger.is_open(car.id()).unwrap());
    }

    #[test]
    fn test_charge_per_slot() {
        let config = ServiceConfig {
            charge_per_slot: true,
            ..Default::default()
        };
        let (svc, clock) = service(&config);
        let mut limo = Requester::with_vehicle(7, VehicleClass::Limo);
        svc.park(&limo).unwrap();
        clock.advance(Duration::from_secs(2 * 3600));
        let receipt = svc.vacate(&mut limo).unwrap();
        assert_eq!(receipt.amount, 2 * 2 * 5);
    }

    #[test]
    fn test_metrics_track_billing() {
        let (svc, clock) = service(&ServiceConfig::default());
        let mut a = Requester::with_vehicle(1, VehicleClass::Car);
        let mut b = Requester::with_vehicle(2, VehicleClass::Limo);
        svc.park(&a).unwrap();
        svc.park(&b).unwrap();
        clock.advance(Duration::from_secs(60));
        svc.vacate(&mut a).unwrap();
        svc.vacate(&mut b).unwrap();

        let m = svc.metrics();
        assert_eq!(m.parks, 2);
        assert_eq!(m.vacates, 2);
        assert_eq!(m.total_billed, 10);
        assert_eq!(m.active(), 0);
    }

    #[test]
    fn test_with_clock_rejects_invalid_config() {
        let config = ServiceConfig {
            banks: 0,
            ..Default::default()
        };
        let err = AllocationService::with_clock(&config, ManualClock::default()).unwrap_err();
        assert!(matches!(err, ServiceError::ConfigError(_)));
    }
}
