//! Background expiry sweeper driving the reconciler's failure path.

#![cfg(feature = "tokio-runtime")]

mod common;

use std::time::Duration;

use common::{base_time, default_env};
use slotcore::core::{BookingOutcome, BookingStatus, NewSlot, RequestBookingInput};
use slotcore::runtime::spawn_expiry_sweeper;
use slotcore::util::{ActivityId, CustomerId};

#[tokio::test(flavor = "multi_thread")]
async fn sweeper_expires_overdue_pending_bookings() {
    let env = default_env();
    let start = base_time() + chrono::Duration::hours(2);
    let slot = env
        .system
        .authoring
        .create_slot(&NewSlot {
            activity: ActivityId::new(),
            instructor: None,
            start,
            end: start + chrono::Duration::hours(1),
            capacity: 1,
            price_minor: 1000,
            waitlist_enabled: true,
        })
        .unwrap();

    let BookingOutcome::Reserved(pending) =
        env.system.admission.request_booking(&RequestBookingInput {
            slot_id: slot,
            customer_id: CustomerId::new(),
            attendee_count: 1,
        })
    else {
        panic!("expected reservation");
    };
    let BookingOutcome::Waitlisted(waiting) =
        env.system.admission.request_booking(&RequestBookingInput {
            slot_id: slot,
            customer_id: CustomerId::new(),
            attendee_count: 1,
        })
    else {
        panic!("expected waitlist");
    };

    // Push the clock past the pending-payment deadline, then let the
    // sweeper tick.
    env.clock.set(base_time() + chrono::Duration::minutes(20));

    let handle = spawn_expiry_sweeper(
        env.system.reconciler.clone(),
        env.clock.clone() as _,
        Duration::from_millis(20),
    );
    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.stop().await;

    assert_eq!(
        env.system.bookings.get(pending).unwrap().status,
        BookingStatus::Cancelled
    );
    // The freed seat went to the waitlisted booking via the shared
    // failure path.
    assert_eq!(
        env.system.bookings.get(waiting).unwrap().status,
        BookingStatus::PendingPayment
    );
}
