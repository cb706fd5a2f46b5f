//! Domain core: slots, bookings, admission, reconciliation, waitlist,
//! conflict detection, check-in, and audit.

pub mod admission;
pub mod audit;
pub mod authoring;
pub mod booking;
pub mod checkin;
pub mod conflict;
pub mod error;
pub mod reconcile;
pub mod slot;
pub mod waitlist;

pub use admission::{AdmissionController, BookingOutcome, RejectReason, RequestBookingInput};
pub use audit::{
    build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, PostgresAuditSink,
    SharedAuditSink,
};
pub use authoring::{
    BulkSlotOutcome, BulkSlotRequest, NewSlot, SkipReason, SkippedCandidate, SlotAuthoring,
    TimeWindow,
};
pub use booking::{Booking, BookingStatus, BookingStore, CancelReason};
pub use checkin::{
    AttendanceOutcome, AttendanceRecord, CheckInToken, CheckInTokenService, ScanConfirmation,
};
pub use conflict::{intervals_overlap, ConflictDetector};
pub use error::{AppResult, BookingError, TokenRejection};
pub use reconcile::{
    AnomalyKind, PaymentAnomaly, PaymentEvent, PaymentOutcome, PaymentReconciler,
};
pub use slot::{CapacitySnapshot, SeatRejection, Slot, SlotStatus, SlotStore};
pub use waitlist::WaitlistPromoter;
