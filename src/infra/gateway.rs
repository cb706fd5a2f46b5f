//! Payment gateway boundary.
//!
//! The core only depends on the narrow charge-creation call plus the
//! asynchronous event tuple delivered back to the reconciler; specific
//! gateway wire formats live outside the crate.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::BookingError;

/// A charge request as sent to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Amount in minor currency units.
    pub amount_minor: u64,
    /// ISO currency code.
    pub currency: String,
    /// Caller reference (the booking id).
    pub reference: String,
}

/// Outbound payment gateway capability.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a charge and return the gateway's external order id.
    ///
    /// Called strictly outside any capacity-serialization region.
    async fn create_charge(
        &self,
        amount_minor: u64,
        currency: &str,
        reference: &str,
    ) -> Result<String, BookingError>;
}

/// In-memory gateway for dev and tests: records requests and hands back
/// synthetic order ids. Can be told to fail.
#[derive(Default)]
pub struct RecordingGateway {
    charges: Mutex<Vec<ChargeRequest>>,
    fail_next: Mutex<bool>,
}

impl RecordingGateway {
    /// Create an empty recording gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_charge` call fail.
    pub fn fail_next(&self) {
        *self.fail_next.lock() = true;
    }

    /// Snapshot of everything charged so far.
    #[must_use]
    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_charge(
        &self,
        amount_minor: u64,
        currency: &str,
        reference: &str,
    ) -> Result<String, BookingError> {
        if std::mem::take(&mut *self.fail_next.lock()) {
            return Err(BookingError::Backend("gateway unavailable".into()));
        }
        self.charges.lock().push(ChargeRequest {
            amount_minor,
            currency: currency.to_string(),
            reference: reference.to_string(),
        });
        Ok(format!("chg-{}", Uuid::new_v4().simple()))
    }
}
