//! FIFO waitlist promotion.

use std::sync::Arc;

use crate::config::BookingConfig;
use crate::core::audit::{self, SharedAuditSink};
use crate::core::booking::{BookingStatus, BookingStore};
use crate::core::slot::SlotStore;
use crate::infra::notify::{BookingNotice, NoticeKind, Notifier};
use crate::util::{BookingId, Clock, SlotId};

/// Promotes the oldest waitlisted booking when a seat frees.
///
/// Callers invoke this once per seat-releasing event, never in a loop, so a
/// single freed seat can never over-promote. Promotion is strictly FIFO: if
/// the oldest entry needs more seats than are free, nothing is promoted and
/// later, smaller entries do not jump the queue.
pub struct WaitlistPromoter {
    slots: Arc<SlotStore>,
    bookings: Arc<BookingStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
    audit: Option<SharedAuditSink>,
}

impl WaitlistPromoter {
    /// Wire up a promoter.
    pub fn new(
        slots: Arc<SlotStore>,
        bookings: Arc<BookingStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
        audit: Option<SharedAuditSink>,
    ) -> Self {
        Self {
            slots,
            bookings,
            notifier,
            clock,
            config,
            audit,
        }
    }

    /// Promote at most one waitlisted booking for the slot.
    ///
    /// Returns the promoted booking id, or `None` when the waitlist is empty,
    /// capacity was already re-consumed, or the candidate vanished
    /// concurrently. Promotion goes through the same capacity gate as any
    /// reservation; it never bypasses the invariant.
    pub fn promote_if_possible(&self, slot_id: SlotId) -> Option<BookingId> {
        let candidate = self.bookings.oldest_waitlisted(slot_id)?;

        if self.slots.reserve_seats(slot_id, candidate.attendees).is_err() {
            tracing::debug!(slot = %slot_id, "no promotion: capacity unavailable");
            return None;
        }

        let due = self.clock.now() + self.config.pending_payment_timeout();
        match self.bookings.transition_from(
            candidate.id,
            BookingStatus::Waitlisted,
            BookingStatus::PendingPayment,
            None,
        ) {
            Ok(promoted) => {
                // Deadline starts at promotion, not at original creation.
                let _ = self.bookings.set_payment_due(promoted.id, due);
                self.notifier.notify(BookingNotice {
                    booking_id: promoted.id,
                    customer: promoted.customer,
                    kind: NoticeKind::WaitlistPromoted,
                });
                audit::record(
                    self.audit.as_ref(),
                    audit::build_audit_event(
                        "promote",
                        Some(promoted.id.to_string()),
                        Some(slot_id.to_string()),
                        "system",
                        None,
                    ),
                );
                tracing::info!(booking = %promoted.id, slot = %slot_id, "waitlist booking promoted");
                Some(promoted.id)
            }
            Err(_) => {
                // Candidate was cancelled between selection and transition;
                // hand the seats straight back.
                self.slots.release_seats(slot_id, candidate.attendees);
                tracing::debug!(slot = %slot_id, "promotion candidate gone, seats returned");
                None
            }
        }
    }
}
