//! Notification boundary.
//!
//! The core emits a structured notice on booking state changes; an external
//! notifier renders and delivers email/SMS. The core never formats messages.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::{BookingId, CustomerId};

/// What happened to the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Payment landed; seats are confirmed.
    Confirmed,
    /// Booking was cancelled (payment failure, timeout, or explicit).
    Cancelled,
    /// A seat freed and the booking moved off the waitlist.
    WaitlistPromoted,
}

/// Notification payload handed to the external notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingNotice {
    /// Booking the notice is about.
    pub booking_id: BookingId,
    /// Customer to notify.
    pub customer: CustomerId,
    /// New state of the booking.
    pub kind: NoticeKind,
}

/// External notifier boundary.
pub trait Notifier: Send + Sync {
    /// Emit a notice. Delivery failures are the notifier's concern; the core
    /// does not retry.
    fn notify(&self, notice: BookingNotice);
}

/// Notifier that drops everything; default when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, notice: BookingNotice) {
        tracing::debug!(booking = %notice.booking_id, kind = ?notice.kind, "notice dropped (null notifier)");
    }
}

/// In-memory notifier capturing notices for tests and dev.
#[derive(Default)]
pub struct InMemoryNotifier {
    notices: Mutex<Vec<BookingNotice>>,
}

impl InMemoryNotifier {
    /// Create an empty capture sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    #[must_use]
    pub fn notices(&self) -> Vec<BookingNotice> {
        self.notices.lock().clone()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notice: BookingNotice) {
        self.notices.lock().push(notice);
    }
}
