//! Single-use, time-bound check-in tokens and attendance recording.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::core::audit::{self, SharedAuditSink};
use crate::core::booking::{BookingStatus, BookingStore};
use crate::core::error::TokenRejection;
use crate::core::slot::SlotStore;
use crate::core::BookingError;
use crate::util::{ActivityId, BookingId, Clock, CustomerId};

/// A check-in credential tied one-to-one to a confirmed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInToken {
    /// Opaque, unguessable token value presented at the venue.
    pub value: String,
    /// Booking the token admits.
    pub booking_id: BookingId,
    /// When the token was minted.
    pub issued_at: DateTime<Utc>,
    /// Validity bound; consumption past this instant is rejected.
    pub expires_at: DateTime<Utc>,
    /// Set exactly once, on the scan that consumed the token.
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Whether the attendee arrived within the grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceOutcome {
    /// Scanned before slot start plus the grace window.
    Present,
    /// Scanned after the grace window elapsed.
    Late,
}

/// Append-only record of a successful check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Booking that was checked in.
    pub booking_id: BookingId,
    /// Staff identity that performed the scan.
    pub scanned_by: String,
    /// When the scan happened.
    pub scanned_at: DateTime<Utc>,
    /// Present or late.
    pub outcome: AttendanceOutcome,
}

/// Structured data returned to the scanning client on success,
/// enough to render a confirmation screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfirmation {
    /// The attendance record that was appended.
    pub record: AttendanceRecord,
    /// Customer who owns the booking.
    pub customer: CustomerId,
    /// Activity of the booked slot.
    pub activity: ActivityId,
    /// Seats the booking covers.
    pub attendee_count: u32,
}

#[derive(Default)]
struct TokenTable {
    by_value: HashMap<String, CheckInToken>,
    by_booking: HashMap<BookingId, String>,
}

/// Issues and verifies check-in tokens, recording attendance.
pub struct CheckInTokenService {
    bookings: Arc<BookingStore>,
    slots: Arc<SlotStore>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
    tokens: Mutex<TokenTable>,
    attendance: Mutex<Vec<AttendanceRecord>>,
    audit: Option<SharedAuditSink>,
}

impl CheckInTokenService {
    /// Wire up a token service.
    pub fn new(
        bookings: Arc<BookingStore>,
        slots: Arc<SlotStore>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
        audit: Option<SharedAuditSink>,
    ) -> Self {
        Self {
            bookings,
            slots,
            clock,
            config,
            tokens: Mutex::new(TokenTable::default()),
            attendance: Mutex::new(Vec::new()),
            audit,
        }
    }

    /// Issue a token for a confirmed booking.
    ///
    /// Idempotent: a retry for a booking that already holds a live
    /// (unconsumed) token returns that token instead of minting a second
    /// one. A booking never has more than one live token.
    pub fn issue(&self, booking_id: BookingId) -> Result<CheckInToken, BookingError> {
        let booking = self.bookings.get(booking_id).ok_or(BookingError::NotFound)?;
        if booking.status != BookingStatus::Confirmed {
            return Err(BookingError::TokenInvalid(
                TokenRejection::BookingNotConfirmed,
            ));
        }
        let slot = self.slots.get(booking.slot_id).ok_or(BookingError::NotFound)?;

        let mut table = self.tokens.lock();
        if let Some(existing) = table
            .by_booking
            .get(&booking_id)
            .and_then(|v| table.by_value.get(v))
        {
            if existing.consumed_at.is_none() {
                return Ok(existing.clone());
            }
        }

        let token = CheckInToken {
            value: Uuid::new_v4().simple().to_string(),
            booking_id,
            issued_at: self.clock.now(),
            expires_at: slot.end,
            consumed_at: None,
        };
        table.by_booking.insert(booking_id, token.value.clone());
        table.by_value.insert(token.value.clone(), token.clone());
        tracing::info!(booking = %booking_id, "check-in token issued");
        Ok(token)
    }

    /// Verify a scanned token and consume it, appending an attendance record.
    ///
    /// The consumed check and the consumption happen under one lock, so two
    /// near-simultaneous scans of the same value resolve to exactly one
    /// success and one `AlreadyUsed`.
    pub fn verify_and_consume(
        &self,
        token_value: &str,
        scanned_by: &str,
    ) -> Result<ScanConfirmation, TokenRejection> {
        let now = self.clock.now();

        let booking_id = {
            let mut table = self.tokens.lock();
            let token = table
                .by_value
                .get_mut(token_value)
                .ok_or(TokenRejection::Unknown)?;
            if token.consumed_at.is_some() {
                return Err(TokenRejection::AlreadyUsed);
            }
            if now >= token.expires_at {
                return Err(TokenRejection::Expired);
            }
            let booking_id = token.booking_id;
            let booking = self
                .bookings
                .get(booking_id)
                .ok_or(TokenRejection::BookingNotConfirmed)?;
            if booking.status != BookingStatus::Confirmed {
                return Err(TokenRejection::BookingNotConfirmed);
            }
            token.consumed_at = Some(now);
            booking_id
        };

        // Token is consumed; everything below is entity-local bookkeeping.
        let booking = self
            .bookings
            .get(booking_id)
            .ok_or(TokenRejection::BookingNotConfirmed)?;
        let slot = self
            .slots
            .get(booking.slot_id)
            .ok_or(TokenRejection::BookingNotConfirmed)?;

        let outcome = if now > slot.start + self.config.late_grace() {
            AttendanceOutcome::Late
        } else {
            AttendanceOutcome::Present
        };
        let record = AttendanceRecord {
            booking_id,
            scanned_by: scanned_by.to_string(),
            scanned_at: now,
            outcome,
        };
        self.attendance.lock().push(record.clone());
        audit::record(
            self.audit.as_ref(),
            audit::build_audit_event(
                "scan",
                Some(booking_id.to_string()),
                Some(booking.slot_id.to_string()),
                scanned_by,
                Some(format!("{outcome:?}")),
            ),
        );
        tracing::info!(booking = %booking_id, ?outcome, "check-in recorded");

        Ok(ScanConfirmation {
            record,
            customer: booking.customer,
            activity: slot.activity,
            attendee_count: booking.attendees,
        })
    }

    /// The token currently held by a booking, if any.
    #[must_use]
    pub fn token_for_booking(&self, booking_id: BookingId) -> Option<CheckInToken> {
        let table = self.tokens.lock();
        table
            .by_booking
            .get(&booking_id)
            .and_then(|v| table.by_value.get(v))
            .cloned()
    }

    /// Append-only attendance log, read-only input for external export.
    #[must_use]
    pub fn attendance(&self) -> Vec<AttendanceRecord> {
        self.attendance.lock().clone()
    }
}
