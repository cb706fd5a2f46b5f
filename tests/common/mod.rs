//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use slotcore::builders::{BookingSystem, BookingSystemBuilder};
use slotcore::config::BookingConfig;
use slotcore::core::NewSlot;
use slotcore::infra::notify::InMemoryNotifier;
use slotcore::util::{ActivityId, ManualClock, SlotId};

/// A fixed "now" all tests agree on: Monday 2025-06-02, 08:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
}

pub struct TestEnv {
    pub system: Arc<BookingSystem>,
    pub clock: Arc<ManualClock>,
    pub notifier: Arc<InMemoryNotifier>,
}

/// System with a manual clock pinned at [`base_time`] and a capturing
/// notifier.
pub fn build_env(config: BookingConfig) -> TestEnv {
    let clock = Arc::new(ManualClock::new(base_time()));
    let notifier = Arc::new(InMemoryNotifier::new());
    let system = BookingSystemBuilder::new(config)
        .with_clock(Arc::clone(&clock) as _)
        .with_notifier(Arc::clone(&notifier) as _)
        .build()
        .expect("valid config");
    TestEnv {
        system: Arc::new(system),
        clock,
        notifier,
    }
}

pub fn default_env() -> TestEnv {
    build_env(BookingConfig::default())
}

/// A slot starting two hours after [`base_time`], one hour long.
pub fn make_slot(env: &TestEnv, capacity: u32, waitlist_enabled: bool) -> SlotId {
    let start = base_time() + chrono::Duration::hours(2);
    env.system
        .authoring
        .create_slot(&NewSlot {
            activity: ActivityId::new(),
            instructor: None,
            start,
            end: start + chrono::Duration::hours(1),
            capacity,
            price_minor: 2500,
            waitlist_enabled,
        })
        .expect("slot created")
}
