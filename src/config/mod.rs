//! Configuration models for reservation policy.

pub mod booking;

pub use booking::BookingConfig;
