//! Capacity-safe admission of booking requests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::BookingConfig;
use crate::core::audit::{self, SharedAuditSink};
use crate::core::booking::{Booking, BookingStatus, BookingStore, CancelReason};
use crate::core::slot::{SeatRejection, SlotStatus, SlotStore};
use crate::core::waitlist::WaitlistPromoter;
use crate::core::BookingError;
use crate::infra::notify::{BookingNotice, NoticeKind, Notifier};
use crate::util::{BookingId, Clock, CustomerId, SlotId};

/// Typed input for a booking request, validated at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBookingInput {
    /// Slot to book.
    pub slot_id: SlotId,
    /// Requesting customer.
    pub customer_id: CustomerId,
    /// Seats requested.
    pub attendee_count: u32,
}

/// Why a booking request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Attendee count is zero or over the per-booking maximum.
    InvalidAttendeeCount,
    /// Count exceeds the slot's total capacity; waitlisting could never
    /// satisfy it, so it is rejected outright.
    ExceedsCapacity,
    /// Booking window has closed or the slot already started.
    BookingClosed,
    /// No such slot.
    SlotNotFound,
    /// Slot was cancelled.
    SlotCancelled,
    /// Slot is full and waitlisting is disabled.
    Full,
}

/// Outcome of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingOutcome {
    /// Seats reserved; booking awaits payment.
    Reserved(BookingId),
    /// Slot full; booking queued FIFO for a freed seat.
    Waitlisted(BookingId),
    /// Request declined with a specific reason.
    Rejected(RejectReason),
}

/// The capacity-safe entry point for reserving seats in a slot.
pub struct AdmissionController {
    slots: Arc<SlotStore>,
    bookings: Arc<BookingStore>,
    waitlist: Arc<WaitlistPromoter>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
    audit: Option<SharedAuditSink>,
}

impl AdmissionController {
    /// Wire up an admission controller.
    pub fn new(
        slots: Arc<SlotStore>,
        bookings: Arc<BookingStore>,
        waitlist: Arc<WaitlistPromoter>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
        audit: Option<SharedAuditSink>,
    ) -> Self {
        Self {
            slots,
            bookings,
            waitlist,
            notifier,
            clock,
            config,
            audit,
        }
    }

    /// Decide a booking request: reserve, waitlist, or reject.
    ///
    /// The capacity decision itself is delegated to
    /// [`SlotStore::reserve_seats`], which is atomic per slot; everything
    /// before it is stateless validation.
    pub fn request_booking(&self, input: &RequestBookingInput) -> BookingOutcome {
        let count = input.attendee_count;
        if count == 0 || count > self.config.max_attendees_per_booking {
            tracing::debug!(count, "booking rejected: invalid attendee count");
            return BookingOutcome::Rejected(RejectReason::InvalidAttendeeCount);
        }

        let Some(slot) = self.slots.get(input.slot_id) else {
            return BookingOutcome::Rejected(RejectReason::SlotNotFound);
        };
        if slot.status == SlotStatus::Cancelled {
            return BookingOutcome::Rejected(RejectReason::SlotCancelled);
        }

        let now = self.clock.now();
        if now + self.config.booking_cutoff() >= slot.start {
            tracing::debug!(slot = %slot.id, "booking rejected: window closed");
            return BookingOutcome::Rejected(RejectReason::BookingClosed);
        }

        // A request no capacity raise could ever satisfy is never waitlisted.
        if count > slot.capacity {
            return BookingOutcome::Rejected(RejectReason::ExceedsCapacity);
        }

        match self.slots.reserve_seats(slot.id, count) {
            Ok(_) => {
                let due = now + self.config.pending_payment_timeout();
                let booking = self.bookings.create(
                    slot.id,
                    input.customer_id,
                    count,
                    BookingStatus::PendingPayment,
                    now,
                    Some(due),
                );
                audit::record(
                    self.audit.as_ref(),
                    audit::build_audit_event(
                        "reserve",
                        Some(booking.id.to_string()),
                        Some(slot.id.to_string()),
                        input.customer_id.to_string(),
                        None,
                    ),
                );
                BookingOutcome::Reserved(booking.id)
            }
            Err(SeatRejection::Full) => {
                if slot.waitlist_enabled {
                    let booking = self.bookings.create(
                        slot.id,
                        input.customer_id,
                        count,
                        BookingStatus::Waitlisted,
                        now,
                        None,
                    );
                    audit::record(
                        self.audit.as_ref(),
                        audit::build_audit_event(
                            "waitlist",
                            Some(booking.id.to_string()),
                            Some(slot.id.to_string()),
                            input.customer_id.to_string(),
                            None,
                        ),
                    );
                    BookingOutcome::Waitlisted(booking.id)
                } else {
                    BookingOutcome::Rejected(RejectReason::Full)
                }
            }
            Err(SeatRejection::NotFound) => BookingOutcome::Rejected(RejectReason::SlotNotFound),
            Err(SeatRejection::Cancelled) => BookingOutcome::Rejected(RejectReason::SlotCancelled),
        }
    }

    /// Explicit cancellation by the customer or staff.
    ///
    /// Releases any held seats and gives the freed capacity to the waitlist.
    /// A confirmed booking with a payment reference ends `Refunded`,
    /// otherwise `Cancelled`.
    pub fn cancel_booking(&self, booking_id: BookingId) -> Result<Booking, BookingError> {
        let booking = self.bookings.get(booking_id).ok_or(BookingError::NotFound)?;
        let updated = match booking.status {
            BookingStatus::PendingPayment => {
                let b = self.bookings.transition_from(
                    booking_id,
                    BookingStatus::PendingPayment,
                    BookingStatus::Cancelled,
                    Some(CancelReason::CustomerCancelled),
                )?;
                self.slots.release_seats(b.slot_id, b.attendees);
                self.waitlist.promote_if_possible(b.slot_id);
                b
            }
            BookingStatus::Confirmed => {
                let to = if booking.payment_ref.is_some() {
                    BookingStatus::Refunded
                } else {
                    BookingStatus::Cancelled
                };
                let b = self.bookings.transition_from(
                    booking_id,
                    BookingStatus::Confirmed,
                    to,
                    Some(CancelReason::CustomerCancelled),
                )?;
                self.slots.release_confirmed_seats(b.slot_id, b.attendees);
                self.waitlist.promote_if_possible(b.slot_id);
                b
            }
            BookingStatus::Waitlisted => self.bookings.transition_from(
                booking_id,
                BookingStatus::Waitlisted,
                BookingStatus::Cancelled,
                Some(CancelReason::CustomerCancelled),
            )?,
            from @ (BookingStatus::Cancelled | BookingStatus::Refunded) => {
                return Err(BookingError::IllegalTransition {
                    from,
                    to: BookingStatus::Cancelled,
                })
            }
        };
        self.notifier.notify(BookingNotice {
            booking_id,
            customer: updated.customer,
            kind: NoticeKind::Cancelled,
        });
        audit::record(
            self.audit.as_ref(),
            audit::build_audit_event(
                "cancel",
                Some(booking_id.to_string()),
                Some(updated.slot_id.to_string()),
                updated.customer.to_string(),
                None,
            ),
        );
        Ok(updated)
    }

    /// Withdraw a whole slot, resolving every live booking on it.
    ///
    /// Pending and confirmed bookings release their seats and end
    /// `Cancelled` (or `Refunded` when money moved); waitlisted bookings
    /// are cancelled. No promotion happens, the slot accepts nothing more.
    /// Returns the number of bookings resolved.
    pub fn cancel_slot(&self, slot_id: SlotId) -> Result<usize, BookingError> {
        let slot = self.slots.cancel_slot(slot_id)?;
        let mut resolved = 0;
        for booking in self.bookings.bookings_for_slot(slot.id) {
            let outcome = match booking.status {
                BookingStatus::PendingPayment => {
                    let b = self.bookings.transition_from(
                        booking.id,
                        BookingStatus::PendingPayment,
                        BookingStatus::Cancelled,
                        Some(CancelReason::SlotCancelled),
                    );
                    if b.is_ok() {
                        self.slots.release_seats(slot.id, booking.attendees);
                    }
                    b
                }
                BookingStatus::Confirmed => {
                    let to = if booking.payment_ref.is_some() {
                        BookingStatus::Refunded
                    } else {
                        BookingStatus::Cancelled
                    };
                    let b = self.bookings.transition_from(
                        booking.id,
                        BookingStatus::Confirmed,
                        to,
                        Some(CancelReason::SlotCancelled),
                    );
                    if b.is_ok() {
                        self.slots.release_confirmed_seats(slot.id, booking.attendees);
                    }
                    b
                }
                BookingStatus::Waitlisted => self.bookings.transition_from(
                    booking.id,
                    BookingStatus::Waitlisted,
                    BookingStatus::Cancelled,
                    Some(CancelReason::SlotCancelled),
                ),
                BookingStatus::Cancelled | BookingStatus::Refunded => continue,
            };
            if let Ok(b) = outcome {
                resolved += 1;
                self.notifier.notify(BookingNotice {
                    booking_id: b.id,
                    customer: b.customer,
                    kind: NoticeKind::Cancelled,
                });
            }
        }
        audit::record(
            self.audit.as_ref(),
            audit::build_audit_event(
                "cancel_slot",
                None,
                Some(slot_id.to_string()),
                "admin",
                Some(format!("resolved {resolved} bookings")),
            ),
        );
        tracing::info!(slot = %slot_id, resolved, "slot cancelled");
        Ok(resolved)
    }
}
