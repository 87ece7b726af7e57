// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for first-fit placement and release.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use slot_bank::{BankGroup, RequesterId, ResourceUnit, SlotBank};

/// Fills a bank with alternating one-slot holes so the scan has to walk
/// most of the bitmap before finding a two-slot run.
fn fragmented_bank(capacity: usize) -> SlotBank {
    let bank = SlotBank::new(0, capacity);
    let one = ResourceUnit::new(1).unwrap();
    for i in 0..capacity as u64 {
        bank.try_allocate(RequesterId(i), one).unwrap();
    }
    for i in (0..capacity as u64 - 2).step_by(2) {
        bank.release(RequesterId(i)).unwrap();
    }
    bank.release(RequesterId(capacity as u64 - 2)).unwrap();
    bank.release(RequesterId(capacity as u64 - 1)).unwrap();
    bank
}

fn bench_fragmented_first_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_fit_fragmented");
    let two = ResourceUnit::new(2).unwrap();
    for capacity in [64usize, 1024, 16 * 1024] {
        let bank = fragmented_bank(capacity);
        let candidate = RequesterId(u64::MAX);
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| {
                let handle = bank.try_allocate(candidate, two).unwrap();
                assert!(handle.is_some());
                bank.release(candidate).unwrap();
            })
        });
    }
    group.finish();
}

fn bench_group_churn(c: &mut Criterion) {
    let group = BankGroup::uniform(8, 256);
    let unit = ResourceUnit::new(3).unwrap();
    c.bench_function("group_allocate_release_churn", |b| {
        b.iter(|| {
            for i in 0..64u64 {
                group.allocate(RequesterId(i), unit).unwrap();
            }
            for i in 0..64u64 {
                group.release(RequesterId(i)).unwrap();
            }
        })
    });
}

criterion_group!(benches, bench_fragmented_first_fit, bench_group_churn);
criterion_main!(benches);
