//! Bookings and the centralized status state machine.
//!
//! Status transitions go through a single checked function; no component
//! mutates a status field inline. A booking is only ever moved by one
//! component per transition, and the store's write lock makes the legality
//! check and the update indivisible, which is what resolves races such as a
//! payment success arriving while the expiry sweep is cancelling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::BookingError;
use crate::util::{BookingId, CustomerId, SlotId};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Seats reserved, awaiting a payment outcome.
    PendingPayment,
    /// Queued for a seat; holds no capacity.
    Waitlisted,
    /// Paid for; seats counted as confirmed.
    Confirmed,
    /// Terminal: released or never admitted.
    Cancelled,
    /// Terminal: was confirmed, then money returned.
    Refunded,
}

impl BookingStatus {
    /// Whether moving from `self` to `to` is a legal transition.
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::PendingPayment, Self::Confirmed | Self::Cancelled)
                | (Self::Waitlisted, Self::PendingPayment | Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled | Self::Refunded)
        )
    }
}

/// Why a booking ended up cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Gateway reported a failed charge.
    PaymentFailed,
    /// No payment outcome arrived before the deadline.
    PaymentTimeout,
    /// Paid amount did not match the booking price.
    PaymentMismatch,
    /// Customer or staff cancelled explicitly.
    CustomerCancelled,
    /// The whole slot was withdrawn.
    SlotCancelled,
}

/// A customer's claim on seats in a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier.
    pub id: BookingId,
    /// Slot the seats belong to.
    pub slot_id: SlotId,
    /// Externally authenticated customer.
    pub customer: CustomerId,
    /// Number of seats claimed, always > 0.
    pub attendees: u32,
    /// Current lifecycle status.
    pub status: BookingStatus,
    /// Creation time; primary waitlist ordering key.
    pub created_at: DateTime<Utc>,
    /// Monotonic sequence breaking created-at ties deterministically.
    pub seq: u64,
    /// External gateway order id, set once a payment attempt starts.
    pub payment_ref: Option<String>,
    /// Deadline for the payment outcome while pending.
    pub payment_due_at: Option<DateTime<Utc>>,
    /// Populated when the booking reaches `Cancelled`.
    pub cancel_reason: Option<CancelReason>,
}

/// Store of bookings keyed by id, with the waitlist ordering sequence.
pub struct BookingStore {
    bookings: RwLock<HashMap<BookingId, Booking>>,
    seq: AtomicU64,
}

impl BookingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
            seq: AtomicU64::new(0),
        }
    }

    /// Create and insert a booking in its initial status.
    pub fn create(
        &self,
        slot_id: SlotId,
        customer: CustomerId,
        attendees: u32,
        status: BookingStatus,
        created_at: DateTime<Utc>,
        payment_due_at: Option<DateTime<Utc>>,
    ) -> Booking {
        let booking = Booking {
            id: BookingId::new(),
            slot_id,
            customer,
            attendees,
            status,
            created_at,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            payment_ref: None,
            payment_due_at,
            cancel_reason: None,
        };
        self.bookings.write().insert(booking.id, booking.clone());
        tracing::info!(booking = %booking.id, slot = %slot_id, ?status, "booking created");
        booking
    }

    /// Fetch a copy of a booking.
    #[must_use]
    pub fn get(&self, id: BookingId) -> Option<Booking> {
        self.bookings.read().get(&id).cloned()
    }

    /// Move a booking from an expected status to a new one.
    ///
    /// The check and the update happen under one write lock, so exactly one
    /// of two racing callers wins; the loser gets `IllegalTransition` with
    /// the status the winner left behind.
    pub fn transition_from(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
        reason: Option<CancelReason>,
    ) -> Result<Booking, BookingError> {
        let mut bookings = self.bookings.write();
        let booking = bookings.get_mut(&id).ok_or(BookingError::NotFound)?;
        if booking.status != from || !from.can_transition(to) {
            return Err(BookingError::IllegalTransition {
                from: booking.status,
                to,
            });
        }
        booking.status = to;
        if to == BookingStatus::Cancelled {
            booking.cancel_reason = reason;
        }
        if !matches!(to, BookingStatus::PendingPayment) {
            booking.payment_due_at = None;
        }
        tracing::info!(booking = %id, ?from, ?to, "booking transitioned");
        Ok(booking.clone())
    }

    /// Record the external gateway order id for a booking.
    pub fn set_payment_ref(&self, id: BookingId, reference: String) -> Result<(), BookingError> {
        let mut bookings = self.bookings.write();
        let booking = bookings.get_mut(&id).ok_or(BookingError::NotFound)?;
        booking.payment_ref = Some(reference);
        Ok(())
    }

    /// Set the payment deadline for a pending booking.
    pub fn set_payment_due(
        &self,
        id: BookingId,
        due: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let mut bookings = self.bookings.write();
        let booking = bookings.get_mut(&id).ok_or(BookingError::NotFound)?;
        booking.payment_due_at = Some(due);
        Ok(())
    }

    /// The single oldest waitlisted booking for a slot, FIFO by creation
    /// time with (seq, id) breaking ties.
    #[must_use]
    pub fn oldest_waitlisted(&self, slot_id: SlotId) -> Option<Booking> {
        self.bookings
            .read()
            .values()
            .filter(|b| b.slot_id == slot_id && b.status == BookingStatus::Waitlisted)
            .min_by_key(|b| (b.created_at, b.seq, b.id))
            .cloned()
    }

    /// Ids of pending-payment bookings whose deadline has passed.
    #[must_use]
    pub fn pending_overdue(&self, now: DateTime<Utc>) -> Vec<BookingId> {
        self.bookings
            .read()
            .values()
            .filter(|b| {
                b.status == BookingStatus::PendingPayment
                    && b.payment_due_at.is_some_and(|due| now >= due)
            })
            .map(|b| b.id)
            .collect()
    }

    /// All bookings attached to a slot, for administration and export.
    #[must_use]
    pub fn bookings_for_slot(&self, slot_id: SlotId) -> Vec<Booking> {
        self.bookings
            .read()
            .values()
            .filter(|b| b.slot_id == slot_id)
            .cloned()
            .collect()
    }
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}
