//! Idempotent reconciliation of asynchronous payment outcomes.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::BookingConfig;
use crate::core::audit::{self, SharedAuditSink};
use crate::core::booking::{BookingStatus, BookingStore, CancelReason};
use crate::core::checkin::CheckInTokenService;
use crate::core::slot::SlotStore;
use crate::core::waitlist::WaitlistPromoter;
use crate::core::BookingError;
use crate::infra::gateway::PaymentGateway;
use crate::infra::notify::{BookingNotice, NoticeKind, Notifier};
use crate::util::{BookingId, Clock};

/// Gateway-reported result of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Charge went through.
    Success,
    /// Charge failed or was cancelled.
    Failure,
}

/// The asynchronous callback tuple delivered by the gateway boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Gateway-unique event id; replays of this id are no-ops.
    pub event_id: String,
    /// Booking the payment is for.
    pub booking_id: BookingId,
    /// Success or failure.
    pub outcome: PaymentOutcome,
    /// Amount actually paid, in minor units.
    pub amount_minor: u64,
}

/// Kinds of payment anomalies requiring manual reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A success event arrived after the booking lapsed; auto-confirming
    /// would risk a phantom confirmation, so an operator must resolve it.
    LateSuccess {
        /// Status the booking was found in.
        status: BookingStatus,
    },
    /// Paid amount did not match price times attendee count.
    AmountMismatch {
        /// Expected amount in minor units.
        expected: u64,
        /// Reported amount in minor units.
        actual: u64,
    },
}

/// An operator-visible payment anomaly. Never auto-resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAnomaly {
    /// Event that triggered the anomaly.
    pub event_id: String,
    /// Affected booking.
    pub booking_id: BookingId,
    /// What went wrong.
    pub kind: AnomalyKind,
    /// When the anomaly was detected.
    pub detected_at: DateTime<Utc>,
}

/// Maps gateway events onto booking state transitions, idempotently.
pub struct PaymentReconciler {
    slots: Arc<SlotStore>,
    bookings: Arc<BookingStore>,
    waitlist: Arc<WaitlistPromoter>,
    checkin: Arc<CheckInTokenService>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
    processed: Mutex<HashSet<String>>,
    anomalies: Mutex<Vec<PaymentAnomaly>>,
    audit: Option<SharedAuditSink>,
}

impl PaymentReconciler {
    /// Wire up a reconciler.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        slots: Arc<SlotStore>,
        bookings: Arc<BookingStore>,
        waitlist: Arc<WaitlistPromoter>,
        checkin: Arc<CheckInTokenService>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
        audit: Option<SharedAuditSink>,
    ) -> Self {
        Self {
            slots,
            bookings,
            waitlist,
            checkin,
            gateway,
            notifier,
            clock,
            config,
            processed: Mutex::new(HashSet::new()),
            anomalies: Mutex::new(Vec::new()),
            audit,
        }
    }

    /// Start a payment attempt: create the gateway charge and attach the
    /// external order id to the booking.
    ///
    /// The gateway call happens entirely outside any capacity region; the
    /// seats were reserved before this and stay reserved however slow the
    /// gateway is.
    pub async fn start_payment(&self, booking_id: BookingId) -> Result<String, BookingError> {
        let booking = self.bookings.get(booking_id).ok_or(BookingError::NotFound)?;
        if booking.status != BookingStatus::PendingPayment {
            return Err(BookingError::InvalidRequest(format!(
                "cannot start payment for booking in status {:?}",
                booking.status
            )));
        }
        let slot = self.slots.get(booking.slot_id).ok_or(BookingError::NotFound)?;
        let amount = slot.price_minor * u64::from(booking.attendees);
        let order_id = self
            .gateway
            .create_charge(amount, &self.config.currency, &booking_id.to_string())
            .await?;
        self.bookings.set_payment_ref(booking_id, order_id.clone())?;
        tracing::info!(booking = %booking_id, order = %order_id, "charge created");
        Ok(order_id)
    }

    /// Apply a gateway payment event to the booking state, exactly once per
    /// `event_id`.
    ///
    /// Amount mismatches are treated as FAILURE regardless of the reported
    /// outcome: the seats are released, the booking cancelled, and the call
    /// returns [`BookingError::PaymentMismatch`] so the gateway boundary can
    /// flag the event. Late successes on lapsed bookings land in the anomaly
    /// queue.
    pub fn on_payment_event(&self, event: &PaymentEvent) -> Result<(), BookingError> {
        {
            let mut processed = self.processed.lock();
            if !processed.insert(event.event_id.clone()) {
                tracing::debug!(event = %event.event_id, "duplicate payment event ignored");
                return Err(BookingError::DuplicateEvent(event.event_id.clone()));
            }
        }

        let booking = self
            .bookings
            .get(event.booking_id)
            .ok_or(BookingError::NotFound)?;

        match event.outcome {
            PaymentOutcome::Success => {
                let slot = self.slots.get(booking.slot_id).ok_or(BookingError::NotFound)?;
                let expected = slot.price_minor * u64::from(booking.attendees);
                if event.amount_minor != expected {
                    tracing::warn!(
                        booking = %booking.id,
                        expected,
                        actual = event.amount_minor,
                        "amount mismatch, treating success as failure"
                    );
                    self.push_anomaly(
                        event,
                        AnomalyKind::AmountMismatch {
                            expected,
                            actual: event.amount_minor,
                        },
                    );
                    self.apply_failure(event.booking_id, CancelReason::PaymentMismatch);
                    return Err(BookingError::PaymentMismatch {
                        expected,
                        actual: event.amount_minor,
                    });
                }
                self.apply_success(event);
                Ok(())
            }
            PaymentOutcome::Failure => {
                self.apply_failure(event.booking_id, CancelReason::PaymentFailed);
                Ok(())
            }
        }
    }

    fn apply_success(&self, event: &PaymentEvent) {
        match self.bookings.transition_from(
            event.booking_id,
            BookingStatus::PendingPayment,
            BookingStatus::Confirmed,
            None,
        ) {
            Ok(confirmed) => {
                self.slots.confirm_seats(confirmed.slot_id, confirmed.attendees);
                if let Err(e) = self.checkin.issue(confirmed.id) {
                    tracing::error!(booking = %confirmed.id, error = %e, "token issue failed");
                }
                self.notifier.notify(BookingNotice {
                    booking_id: confirmed.id,
                    customer: confirmed.customer,
                    kind: NoticeKind::Confirmed,
                });
                audit::record(
                    self.audit.as_ref(),
                    audit::build_audit_event(
                        "confirm",
                        Some(confirmed.id.to_string()),
                        Some(confirmed.slot_id.to_string()),
                        "gateway",
                        Some(event.event_id.clone()),
                    ),
                );
            }
            Err(BookingError::IllegalTransition {
                from: BookingStatus::Confirmed,
                ..
            }) => {
                // A distinct event confirming an already-confirmed booking;
                // nothing left to apply.
                tracing::debug!(booking = %event.booking_id, "success on confirmed booking, no-op");
            }
            Err(BookingError::IllegalTransition { from, .. }) => {
                tracing::warn!(
                    booking = %event.booking_id,
                    ?from,
                    "late success on lapsed booking, queued for manual reconciliation"
                );
                self.push_anomaly(event, AnomalyKind::LateSuccess { status: from });
            }
            Err(e) => {
                tracing::error!(booking = %event.booking_id, error = %e, "success event not applied");
            }
        }
    }

    /// Shared failure branch: releases seats, cancels, and backfills from
    /// the waitlist. Both explicit FAILURE events and the expiry sweep end
    /// up here, so the release-and-promote logic exists exactly once.
    fn apply_failure(&self, booking_id: BookingId, reason: CancelReason) {
        match self.bookings.transition_from(
            booking_id,
            BookingStatus::PendingPayment,
            BookingStatus::Cancelled,
            Some(reason),
        ) {
            Ok(cancelled) => {
                self.slots.release_seats(cancelled.slot_id, cancelled.attendees);
                self.notifier.notify(BookingNotice {
                    booking_id: cancelled.id,
                    customer: cancelled.customer,
                    kind: NoticeKind::Cancelled,
                });
                audit::record(
                    self.audit.as_ref(),
                    audit::build_audit_event(
                        if reason == CancelReason::PaymentTimeout {
                            "expire"
                        } else {
                            "cancel"
                        },
                        Some(cancelled.id.to_string()),
                        Some(cancelled.slot_id.to_string()),
                        "system",
                        Some(format!("{reason:?}")),
                    ),
                );
                self.waitlist.promote_if_possible(cancelled.slot_id);
            }
            Err(_) => {
                // Already resolved by a racing event or sweep; the winner
                // did the release.
                tracing::debug!(booking = %booking_id, "failure on non-pending booking, no-op");
            }
        }
    }

    /// Expire pending-payment bookings whose deadline passed, reusing the
    /// failure branch. Returns how many were expired.
    pub fn expire_overdue(&self, now: DateTime<Utc>) -> usize {
        let overdue = self.bookings.pending_overdue(now);
        let count = overdue.len();
        for id in overdue {
            tracing::warn!(booking = %id, "pending payment timed out");
            self.apply_failure(id, CancelReason::PaymentTimeout);
        }
        count
    }

    fn push_anomaly(&self, event: &PaymentEvent, kind: AnomalyKind) {
        self.anomalies.lock().push(PaymentAnomaly {
            event_id: event.event_id.clone(),
            booking_id: event.booking_id,
            kind,
            detected_at: self.clock.now(),
        });
    }

    /// Drain the operator-visible anomaly queue.
    #[must_use]
    pub fn take_anomalies(&self) -> Vec<PaymentAnomaly> {
        std::mem::take(&mut *self.anomalies.lock())
    }
}
