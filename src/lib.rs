//! # Slotcore
//!
//! A concurrency-safe reservation, payment-reconciliation, and check-in core
//! for capacity-limited time slots (classes, workshops, sessions).
//!
//! The crate owns four tightly coupled concerns:
//!
//! - **Admission control**: reserving seats against finite shared capacity
//!   without over-selling under concurrent requests. Every capacity mutation
//!   for a slot serializes on that slot's own mutex; different slots never
//!   contend.
//! - **Payment reconciliation**: mapping asynchronous, possibly-replayed
//!   gateway events onto booking state transitions idempotently, with an
//!   operator-visible anomaly queue for the cases that must not be
//!   auto-resolved.
//! - **Scheduling conflicts**: detecting instructor double-booking at slot
//!   authoring time, for single slots and bulk recurring generation.
//! - **Check-in tokens**: single-use, time-bound credentials verified
//!   atomically at scan time, feeding an append-only attendance log.
//!
//! ## Example
//!
//! ```rust,ignore
//! use slotcore::builders::BookingSystemBuilder;
//! use slotcore::config::BookingConfig;
//! use slotcore::core::{NewSlot, RequestBookingInput};
//!
//! let system = BookingSystemBuilder::new(BookingConfig::default()).build()?;
//!
//! let slot_id = system.authoring.create_slot(&NewSlot { /* ... */ })?;
//! let outcome = system.admission.request_booking(&RequestBookingInput {
//!     slot_id,
//!     customer_id,
//!     attendee_count: 2,
//! });
//! ```
//!
//! Booking state lives in an explicit state machine
//! ([`core::BookingStatus`]); illegal transitions are rejected centrally
//! rather than scattered across call sites. The expected "slot is full"
//! branch is a typed outcome, never an error used for control flow.
//!
//! For complete flows, see:
//! - `tests/admission_test.rs` - concurrent capacity invariant
//! - `tests/reconcile_test.rs` - idempotent payment reconciliation
//! - `tests/checkin_test.rs` - single-use token verification

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Domain core: stores, admission, reconciliation, waitlist, check-in.
pub mod core;
/// Configuration models for reservation policy.
pub mod config;
/// Builders to construct a wired system from configuration.
pub mod builders;
/// Boundary adapters: payment gateway and notification delivery.
pub mod infra;
/// Typed API surface and background workers.
pub mod runtime;
/// Shared utilities.
pub mod util;
