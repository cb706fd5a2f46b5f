//! Error types for the reservation core.

use thiserror::Error;

use crate::core::booking::BookingStatus;

/// Reason a check-in token is rejected at scan time.
///
/// Staff-facing clients show a distinct message per variant so "too late"
/// is never confused with "duplicate attendee".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRejection {
    /// Token exists but its validity window has passed.
    Expired,
    /// Token was already consumed by an earlier scan.
    AlreadyUsed,
    /// Token value is not known to the service.
    Unknown,
    /// The owning booking is no longer (or not yet) confirmed.
    BookingNotConfirmed,
}

impl std::fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Expired => "expired",
            Self::AlreadyUsed => "already used",
            Self::Unknown => "unknown token",
            Self::BookingNotConfirmed => "booking not confirmed",
        };
        f.write_str(s)
    }
}

/// Errors produced by reservation-core components.
///
/// The expected "slot is full" branch of admission is NOT an error; it is a
/// typed [`BookingOutcome`](crate::core::admission::BookingOutcome) variant.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Operation would break the seat-capacity invariant.
    #[error("capacity exceeded")]
    CapacityExceeded,
    /// Instructor already assigned to an overlapping slot.
    #[error("scheduling conflict")]
    SchedulingConflict,
    /// Malformed or out-of-policy request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Paid amount does not match the booking's expected price.
    #[error("payment amount mismatch: expected {expected}, got {actual}")]
    PaymentMismatch {
        /// Amount the booking is priced at, in minor units.
        expected: u64,
        /// Amount the gateway reported, in minor units.
        actual: u64,
    },
    /// Check-in token rejected at scan time.
    #[error("token invalid: {0}")]
    TokenInvalid(TokenRejection),
    /// Payment event already applied; idempotency short-circuit.
    #[error("duplicate payment event: {0}")]
    DuplicateEvent(String),
    /// Referenced entity does not exist.
    #[error("not found")]
    NotFound,
    /// Requested booking state transition is not legal.
    #[error("illegal transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Status the booking is currently in.
        from: BookingStatus,
        /// Status the caller tried to move it to.
        to: BookingStatus,
    },
    /// Boundary-specific failure with context (gateway, notifier, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
