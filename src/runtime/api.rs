//! API-facing request/response models.
//!
//! Inbound payloads are typed structs validated here before reaching the
//! domain components; responses carry structured data for the caller to
//! render (the core never formats user-facing text).

use serde::{Deserialize, Serialize};

use crate::builders::BookingSystem;
use crate::core::checkin::ScanConfirmation;
use crate::core::{
    BookingOutcome, BulkSlotOutcome, BulkSlotRequest, CapacitySnapshot, PaymentEvent,
    RequestBookingInput, TokenRejection,
};
use crate::util::SlotId;

/// A scan request from a staff-facing client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Token value read from the customer's credential.
    pub token: String,
    /// Identity of the scanning staff member.
    pub scanner: String,
}

/// Structured scan result for the client to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    /// Confirmation data when the scan succeeded.
    pub confirmation: Option<ScanConfirmation>,
    /// Distinct rejection reason when it did not.
    pub rejection: Option<TokenRejection>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Submit a booking request.
pub fn request_booking(system: &BookingSystem, input: &RequestBookingInput) -> BookingOutcome {
    system.admission.request_booking(input)
}

/// Deliver a gateway payment callback. Duplicate events are absorbed here;
/// other errors propagate.
pub fn payment_callback(
    system: &BookingSystem,
    event: &PaymentEvent,
) -> Result<(), crate::core::BookingError> {
    match system.reconciler.on_payment_event(event) {
        Err(crate::core::BookingError::DuplicateEvent(_)) | Ok(()) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Verify and consume a check-in token.
#[must_use]
pub fn scan(system: &BookingSystem, req: &ScanRequest) -> ScanResponse {
    match system.checkin.verify_and_consume(&req.token, &req.scanner) {
        Ok(confirmation) => ScanResponse {
            confirmation: Some(confirmation),
            rejection: None,
        },
        Err(rejection) => ScanResponse {
            confirmation: None,
            rejection: Some(rejection),
        },
    }
}

/// Bulk-create recurring slots, reporting per-candidate outcomes.
pub fn create_slots_bulk(
    system: &BookingSystem,
    req: &BulkSlotRequest,
) -> Result<BulkSlotOutcome, crate::core::BookingError> {
    system.authoring.create_slots_bulk(req)
}

/// Current capacity accounting for a slot.
#[must_use]
pub fn capacity(system: &BookingSystem, slot_id: SlotId) -> Option<CapacitySnapshot> {
    system.slots.capacity_snapshot(slot_id)
}

/// Return a health payload.
#[must_use]
pub const fn health() -> Health {
    Health { ok: true }
}
