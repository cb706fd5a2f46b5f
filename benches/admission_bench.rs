//! Benchmarks for the reservation core.
//!
//! Benchmarks cover:
//! - Seat reservation/release throughput on a single slot
//! - Admission decisions across many independent slots
//! - Conflict detection against a populated instructor schedule

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{TimeZone, Utc};
use slotcore::builders::{BookingSystem, BookingSystemBuilder};
use slotcore::config::BookingConfig;
use slotcore::core::{NewSlot, RequestBookingInput};
use slotcore::util::{ActivityId, CustomerId, InstructorId, ManualClock, SlotId};

fn build_system() -> (Arc<BookingSystem>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap(),
    ));
    let system = BookingSystemBuilder::new(BookingConfig::default())
        .with_clock(clock.clone() as _)
        .build()
        .expect("valid config");
    (Arc::new(system), clock)
}

fn make_slot(system: &BookingSystem, capacity: u32) -> SlotId {
    let start = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
    system
        .authoring
        .create_slot(&NewSlot {
            activity: ActivityId::new(),
            instructor: None,
            start,
            end: start + chrono::Duration::hours(1),
            capacity,
            price_minor: 2500,
            waitlist_enabled: false,
        })
        .expect("slot created")
}

fn bench_reserve_release(c: &mut Criterion) {
    let (system, _clock) = build_system();
    let slot = make_slot(&system, u32::MAX / 2);

    let mut group = c.benchmark_group("slot_store");
    group.throughput(Throughput::Elements(1));
    group.bench_function("reserve_release_cycle", |b| {
        b.iter(|| {
            let snap = system.slots.reserve_seats(black_box(slot), 1).unwrap();
            system.slots.release_seats(slot, 1);
            black_box(snap)
        });
    });
    group.finish();
}

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("admission");
    for slots in [1u32, 8, 64] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("request_booking_full_slot", slots),
            &slots,
            |b, &slot_count| {
                let (system, _clock) = build_system();
                // Pre-fill every slot so each request exercises the whole
                // validation + capacity path without accumulating bookings.
                let ids: Vec<_> = (0..slot_count)
                    .map(|_| {
                        let id = make_slot(&system, 1);
                        system.slots.reserve_seats(id, 1).unwrap();
                        id
                    })
                    .collect();
                let customer = CustomerId::new();
                let mut i = 0usize;
                b.iter(|| {
                    let slot_id = ids[i % ids.len()];
                    i += 1;
                    black_box(system.admission.request_booking(&RequestBookingInput {
                        slot_id,
                        customer_id: customer,
                        attendee_count: 1,
                    }))
                });
            },
        );
    }
    group.finish();
}

fn bench_conflict_check(c: &mut Criterion) {
    let (system, _clock) = build_system();
    let instructor = InstructorId::new();

    // One slot per day for roughly a year.
    for day in 0..365i64 {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
            + chrono::Duration::days(day + 1);
        system
            .authoring
            .create_slot(&NewSlot {
                activity: ActivityId::new(),
                instructor: Some(instructor),
                start,
                end: start + chrono::Duration::hours(1),
                capacity: 10,
                price_minor: 2500,
                waitlist_enabled: false,
            })
            .expect("slot created");
    }

    let probe_start = Utc.with_ymd_and_hms(2026, 7, 1, 10, 30, 0).unwrap();
    c.bench_function("conflict_check_365_slots", |b| {
        let detector = slotcore::core::ConflictDetector::new(system.slots.clone());
        b.iter(|| {
            black_box(detector.has_conflict(
                instructor,
                black_box(probe_start),
                probe_start + chrono::Duration::hours(1),
                None,
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_reserve_release,
    bench_admission,
    bench_conflict_check
);
criterion_main!(benches);
