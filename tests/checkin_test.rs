//! Check-in token lifecycle: issue idempotency, atomic single-use
//! consumption, expiry, and attendance outcomes.

mod common;

use std::sync::Arc;
use std::thread;

use common::{base_time, default_env, make_slot, TestEnv};
use slotcore::core::{
    AttendanceOutcome, BookingError, BookingOutcome, PaymentEvent, PaymentOutcome,
    RequestBookingInput, TokenRejection,
};
use slotcore::util::{BookingId, CustomerId, SlotId};

/// Reserve and pay a booking so it holds a token.
fn confirmed_booking(env: &TestEnv, slot: SlotId, count: u32) -> BookingId {
    let BookingOutcome::Reserved(id) =
        env.system.admission.request_booking(&RequestBookingInput {
            slot_id: slot,
            customer_id: CustomerId::new(),
            attendee_count: count,
        })
    else {
        panic!("expected reservation");
    };
    env.system
        .reconciler
        .on_payment_event(&PaymentEvent {
            event_id: format!("ev-{id}"),
            booking_id: id,
            outcome: PaymentOutcome::Success,
            amount_minor: 2500 * u64::from(count),
        })
        .unwrap();
    id
}

#[test]
fn scan_once_present_scan_again_already_used() {
    // Confirm, scan (present), re-scan (already used).
    let env = default_env();
    let slot = make_slot(&env, 5, false);
    let booking = confirmed_booking(&env, slot, 2);

    let token = env.system.checkin.token_for_booking(booking).unwrap();

    // Slot starts at base + 2h; scan within the grace window.
    env.clock
        .set(base_time() + chrono::Duration::hours(2) + chrono::Duration::minutes(5));

    let confirmation = env
        .system
        .checkin
        .verify_and_consume(&token.value, "scanner-1")
        .unwrap();
    assert_eq!(confirmation.record.outcome, AttendanceOutcome::Present);
    assert_eq!(confirmation.attendee_count, 2);

    let rejection = env
        .system
        .checkin
        .verify_and_consume(&token.value, "scanner-1")
        .unwrap_err();
    assert_eq!(rejection, TokenRejection::AlreadyUsed);

    assert_eq!(env.system.checkin.attendance().len(), 1);
}

#[test]
fn concurrent_scans_yield_one_attendance_record() {
    let env = default_env();
    let slot = make_slot(&env, 5, false);
    let booking = confirmed_booking(&env, slot, 1);
    let token = env.system.checkin.token_for_booking(booking).unwrap();

    env.clock.set(base_time() + chrono::Duration::hours(2));

    let mut handles = Vec::new();
    for i in 0..8 {
        let system = Arc::clone(&env.system);
        let value = token.value.clone();
        handles.push(thread::spawn(move || {
            system
                .checkin
                .verify_and_consume(&value, &format!("scanner-{i}"))
                .is_ok()
        }));
    }

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(env.system.checkin.attendance().len(), 1);
}

#[test]
fn late_scan_records_late_outcome() {
    let env = default_env();
    let slot = make_slot(&env, 5, false);
    let booking = confirmed_booking(&env, slot, 1);
    let token = env.system.checkin.token_for_booking(booking).unwrap();

    // Default grace is 10 minutes after start; scan 20 minutes in.
    env.clock
        .set(base_time() + chrono::Duration::hours(2) + chrono::Duration::minutes(20));

    let confirmation = env
        .system
        .checkin
        .verify_and_consume(&token.value, "scanner-1")
        .unwrap();
    assert_eq!(confirmation.record.outcome, AttendanceOutcome::Late);
}

#[test]
fn expired_token_distinct_from_already_used() {
    let env = default_env();
    let slot = make_slot(&env, 5, false);
    let booking = confirmed_booking(&env, slot, 1);
    let token = env.system.checkin.token_for_booking(booking).unwrap();

    // Token expires with the slot end (base + 3h).
    env.clock.set(base_time() + chrono::Duration::hours(4));
    let rejection = env
        .system
        .checkin
        .verify_and_consume(&token.value, "scanner-1")
        .unwrap_err();
    assert_eq!(rejection, TokenRejection::Expired);
    assert!(env.system.checkin.attendance().is_empty());
}

#[test]
fn unknown_token_rejected() {
    let env = default_env();
    let rejection = env
        .system
        .checkin
        .verify_and_consume("no-such-token", "scanner-1")
        .unwrap_err();
    assert_eq!(rejection, TokenRejection::Unknown);
}

#[test]
fn cancelled_booking_token_rejected() {
    let env = default_env();
    let slot = make_slot(&env, 5, false);
    let booking = confirmed_booking(&env, slot, 1);
    let token = env.system.checkin.token_for_booking(booking).unwrap();

    env.system.admission.cancel_booking(booking).unwrap();

    env.clock.set(base_time() + chrono::Duration::hours(2));
    let rejection = env
        .system
        .checkin
        .verify_and_consume(&token.value, "scanner-1")
        .unwrap_err();
    assert_eq!(rejection, TokenRejection::BookingNotConfirmed);
}

#[test]
fn reissue_returns_existing_live_token() {
    let env = default_env();
    let slot = make_slot(&env, 5, false);
    let booking = confirmed_booking(&env, slot, 1);

    let first = env.system.checkin.token_for_booking(booking).unwrap();
    let again = env.system.checkin.issue(booking).unwrap();
    assert_eq!(first.value, again.value);
}

#[test]
fn issue_for_pending_booking_fails() {
    let env = default_env();
    let slot = make_slot(&env, 5, false);
    let BookingOutcome::Reserved(id) =
        env.system.admission.request_booking(&RequestBookingInput {
            slot_id: slot,
            customer_id: CustomerId::new(),
            attendee_count: 1,
        })
    else {
        panic!("expected reservation");
    };
    let err = env.system.checkin.issue(id).unwrap_err();
    assert!(matches!(
        err,
        BookingError::TokenInvalid(TokenRejection::BookingNotConfirmed)
    ));
}
