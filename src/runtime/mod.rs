//! Typed API surface and background workers.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod sweeper;

pub use api::{health, payment_callback, request_booking, scan, Health, ScanRequest, ScanResponse};
#[cfg(feature = "tokio-runtime")]
pub use sweeper::{spawn_expiry_sweeper, SweeperHandle};
