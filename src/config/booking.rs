//! Reservation policy configuration.

use serde::{Deserialize, Serialize};

/// Policy knobs for admission, payment, and check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Maximum attendees a single booking may claim.
    pub max_attendees_per_booking: u32,
    /// Seconds a pending-payment booking may wait for an outcome before the
    /// sweep expires it through the failure path.
    pub pending_payment_timeout_secs: u64,
    /// Bookings close this many seconds before the slot starts (0 = bookable
    /// until the start instant).
    pub booking_cutoff_secs: u64,
    /// Scans later than slot start plus this window record `late`.
    pub late_grace_secs: u64,
    /// Interval between expiry sweeps.
    pub sweep_interval_secs: u64,
    /// ISO currency code used for gateway charges.
    pub currency: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_attendees_per_booking: 10,
            pending_payment_timeout_secs: 15 * 60,
            booking_cutoff_secs: 0,
            late_grace_secs: 10 * 60,
            sweep_interval_secs: 60,
            currency: "EUR".to_string(),
        }
    }
}

impl BookingConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attendees_per_booking == 0 {
            return Err("max_attendees_per_booking must be greater than 0".into());
        }
        if self.pending_payment_timeout_secs == 0 {
            return Err("pending_payment_timeout_secs must be greater than 0".into());
        }
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".into());
        }
        if self.currency.len() != 3 {
            return Err("currency must be a 3-letter ISO code".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Pending-payment timeout as a chrono duration.
    #[must_use]
    pub fn pending_payment_timeout(&self) -> chrono::Duration {
        secs(self.pending_payment_timeout_secs)
    }

    /// Booking cutoff as a chrono duration.
    #[must_use]
    pub fn booking_cutoff(&self) -> chrono::Duration {
        secs(self.booking_cutoff_secs)
    }

    /// Late-grace window as a chrono duration.
    #[must_use]
    pub fn late_grace(&self) -> chrono::Duration {
        secs(self.late_grace_secs)
    }
}

/// Seconds to a chrono duration, clamped inside chrono's representable range.
fn secs(value: u64) -> chrono::Duration {
    let clamped = i64::try_from(value).unwrap_or(i64::MAX);
    chrono::Duration::try_seconds(clamped).unwrap_or(chrono::Duration::MAX)
}
