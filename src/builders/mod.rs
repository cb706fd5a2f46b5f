//! Builders to construct the reservation core from configuration.

pub mod system_builder;

pub use system_builder::{BookingSystem, BookingSystemBuilder};
