//! Admission control under concurrency.
//!
//! Validates:
//! 1. The capacity invariant holds under heavy thread contention
//! 2. Full slots waitlist (enabled) or reject (disabled)
//! 3. Boundary validation rejects with specific reasons
//! 4. Explicit cancellation releases seats and backfills the waitlist

mod common;

use std::sync::Arc;
use std::thread;

use common::{base_time, build_env, default_env, make_slot};
use rand::Rng;
use slotcore::config::BookingConfig;
use slotcore::core::{BookingOutcome, BookingStatus, RejectReason, RequestBookingInput};
use slotcore::util::CustomerId;

fn input(slot_id: slotcore::util::SlotId, count: u32) -> RequestBookingInput {
    RequestBookingInput {
        slot_id,
        customer_id: CustomerId::new(),
        attendee_count: count,
    }
}

#[test]
fn hundred_concurrent_requests_never_oversell() {
    let env = default_env();
    let slot = make_slot(&env, 10, true);

    let mut handles = Vec::new();
    for _ in 0..100 {
        let system = Arc::clone(&env.system);
        handles.push(thread::spawn(move || {
            system.admission.request_booking(&input(slot, 1))
        }));
    }

    let mut reserved = 0;
    let mut waitlisted = 0;
    for h in handles {
        match h.join().unwrap() {
            BookingOutcome::Reserved(_) => reserved += 1,
            BookingOutcome::Waitlisted(_) => waitlisted += 1,
            BookingOutcome::Rejected(r) => panic!("unexpected rejection: {r:?}"),
        }
    }

    assert_eq!(reserved, 10);
    assert_eq!(waitlisted, 90);

    let snap = env.system.slots.capacity_snapshot(slot).unwrap();
    assert_eq!(snap.reserved, 10);
    assert_eq!(snap.confirmed, 0);
    assert!(snap.confirmed + snap.reserved <= snap.capacity);
}

#[test]
fn concurrent_multi_seat_requests_respect_invariant() {
    let env = default_env();
    let slot = make_slot(&env, 10, false);

    let mut rng = rand::rng();
    let mut handles = Vec::new();
    for _ in 0..40 {
        let system = Arc::clone(&env.system);
        let count = rng.random_range(1..=3);
        handles.push(thread::spawn(move || {
            system.admission.request_booking(&input(slot, count))
        }));
    }
    for h in handles {
        let _ = h.join().unwrap();
    }

    let snap = env.system.slots.capacity_snapshot(slot).unwrap();
    assert!(snap.confirmed + snap.reserved <= snap.capacity);
}

#[test]
fn capacity_one_two_bookings_one_waitlisted() {
    // Scenario: last seat contested with waitlisting enabled.
    let env = default_env();
    let slot = make_slot(&env, 1, true);

    let a = env.system.admission.request_booking(&input(slot, 1));
    let b = env.system.admission.request_booking(&input(slot, 1));

    assert!(matches!(a, BookingOutcome::Reserved(_)));
    assert!(matches!(b, BookingOutcome::Waitlisted(_)));
}

#[test]
fn capacity_one_two_bookings_one_rejected_without_waitlist() {
    let env = default_env();
    let slot = make_slot(&env, 1, false);

    let a = env.system.admission.request_booking(&input(slot, 1));
    let b = env.system.admission.request_booking(&input(slot, 1));

    assert!(matches!(a, BookingOutcome::Reserved(_)));
    assert!(matches!(
        b,
        BookingOutcome::Rejected(RejectReason::Full)
    ));
}

#[test]
fn zero_attendees_rejected() {
    let env = default_env();
    let slot = make_slot(&env, 5, true);
    assert!(matches!(
        env.system.admission.request_booking(&input(slot, 0)),
        BookingOutcome::Rejected(RejectReason::InvalidAttendeeCount)
    ));
}

#[test]
fn over_max_per_booking_rejected() {
    let env = build_env(BookingConfig {
        max_attendees_per_booking: 4,
        ..BookingConfig::default()
    });
    let slot = make_slot(&env, 20, true);
    assert!(matches!(
        env.system.admission.request_booking(&input(slot, 5)),
        BookingOutcome::Rejected(RejectReason::InvalidAttendeeCount)
    ));
}

#[test]
fn count_beyond_capacity_rejected_even_on_empty_slot() {
    // Could never be satisfied without an administrative capacity raise, so
    // it is rejected outright rather than waitlisted.
    let env = default_env();
    let slot = make_slot(&env, 3, true);
    assert!(matches!(
        env.system.admission.request_booking(&input(slot, 4)),
        BookingOutcome::Rejected(RejectReason::ExceedsCapacity)
    ));
}

#[test]
fn booking_after_slot_start_rejected() {
    let env = default_env();
    let slot = make_slot(&env, 5, true);

    env.clock.set(base_time() + chrono::Duration::hours(3));
    assert!(matches!(
        env.system.admission.request_booking(&input(slot, 1)),
        BookingOutcome::Rejected(RejectReason::BookingClosed)
    ));
}

#[test]
fn cutoff_window_closes_bookings_early() {
    let env = build_env(BookingConfig {
        booking_cutoff_secs: 3600,
        ..BookingConfig::default()
    });
    // Slot starts at base + 2h; cutoff one hour before start.
    let slot = make_slot(&env, 5, true);

    env.clock.set(base_time() + chrono::Duration::minutes(70));
    assert!(matches!(
        env.system.admission.request_booking(&input(slot, 1)),
        BookingOutcome::Rejected(RejectReason::BookingClosed)
    ));
}

#[test]
fn unknown_slot_rejected() {
    let env = default_env();
    assert!(matches!(
        env.system
            .admission
            .request_booking(&input(slotcore::util::SlotId::new(), 1)),
        BookingOutcome::Rejected(RejectReason::SlotNotFound)
    ));
}

#[test]
fn cancel_pending_booking_releases_seats_and_promotes() {
    let env = default_env();
    let slot = make_slot(&env, 1, true);

    let BookingOutcome::Reserved(first) =
        env.system.admission.request_booking(&input(slot, 1))
    else {
        panic!("expected reservation");
    };
    let BookingOutcome::Waitlisted(second) =
        env.system.admission.request_booking(&input(slot, 1))
    else {
        panic!("expected waitlist");
    };

    env.system.admission.cancel_booking(first).unwrap();

    assert_eq!(
        env.system.bookings.get(first).unwrap().status,
        BookingStatus::Cancelled
    );
    // Freed seat went to the waitlisted booking.
    assert_eq!(
        env.system.bookings.get(second).unwrap().status,
        BookingStatus::PendingPayment
    );
    let snap = env.system.slots.capacity_snapshot(slot).unwrap();
    assert_eq!(snap.reserved, 1);
}

#[test]
fn cancel_slot_resolves_all_live_bookings() {
    let env = default_env();
    let slot = make_slot(&env, 1, true);

    let BookingOutcome::Reserved(pending) =
        env.system.admission.request_booking(&input(slot, 1))
    else {
        panic!("expected reservation");
    };
    let BookingOutcome::Waitlisted(waiting) =
        env.system.admission.request_booking(&input(slot, 1))
    else {
        panic!("expected waitlist");
    };

    let resolved = env.system.admission.cancel_slot(slot).unwrap();
    assert_eq!(resolved, 2);

    assert_eq!(
        env.system.bookings.get(pending).unwrap().status,
        BookingStatus::Cancelled
    );
    // The waitlisted entry is cancelled, not promoted into a dead slot.
    assert_eq!(
        env.system.bookings.get(waiting).unwrap().status,
        BookingStatus::Cancelled
    );

    assert!(matches!(
        env.system.admission.request_booking(&input(slot, 1)),
        BookingOutcome::Rejected(RejectReason::SlotCancelled)
    ));
}

#[test]
fn cancel_twice_is_illegal() {
    let env = default_env();
    let slot = make_slot(&env, 2, false);
    let BookingOutcome::Reserved(id) = env.system.admission.request_booking(&input(slot, 1))
    else {
        panic!("expected reservation");
    };
    env.system.admission.cancel_booking(id).unwrap();
    assert!(env.system.admission.cancel_booking(id).is_err());
}
