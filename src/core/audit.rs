//! Audit sink implementations.
//!
//! Every admission, promotion, payment transition, expiry, and scan records
//! an event. Provides an in-memory sink and Postgres schema definitions for
//! persistence.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::clock::now_ms;

/// Audit event structure.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related booking identifier, when applicable.
    pub booking_id: Option<String>,
    /// Related slot identifier, when applicable.
    pub slot_id: Option<String>,
    /// Acting identity (customer, scanner, or `system`).
    pub actor: String,
    /// Action taken (reserve, waitlist, confirm, cancel, promote, expire, scan, skip).
    pub action: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Shared, optionally-absent audit sink as held by components.
pub type SharedAuditSink = Arc<Mutex<Box<dyn AuditSink>>>;

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Postgres-backed audit sink (schema-only; DB I/O not wired).
pub struct PostgresAuditSink;

impl PostgresAuditSink {
    /// Returns SQL migration statements for the audit log.
    #[must_use]
    pub fn migrations() -> &'static [&'static str] {
        &[
            r"
CREATE TABLE IF NOT EXISTS sc_audit_events (
    event_id TEXT PRIMARY KEY,
    booking_id TEXT,
    slot_id TEXT,
    actor TEXT NOT NULL,
    action TEXT NOT NULL,
    payload JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_sc_audit_events_booking ON sc_audit_events (booking_id);
CREATE INDEX IF NOT EXISTS idx_sc_audit_events_slot ON sc_audit_events (slot_id);
CREATE INDEX IF NOT EXISTS idx_sc_audit_events_action_created ON sc_audit_events (action, created_at);
",
        ]
    }
}

impl AuditSink for PostgresAuditSink {
    fn record(&mut self, _event: AuditEvent) {
        // Stub: actual DB writes require a runtime + client; left to integration layer.
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    action: impl Into<String>,
    booking_id: Option<String>,
    slot_id: Option<String>,
    actor: impl Into<String>,
    payload: Option<String>,
) -> AuditEvent {
    let action = action.into();
    AuditEvent {
        event_id: format!("{}-{}", action, now_ms()),
        booking_id,
        slot_id,
        actor: actor.into(),
        action,
        created_at_ms: now_ms(),
        payload,
    }
}

/// Record an event on an optional shared sink.
pub fn record(audit: Option<&SharedAuditSink>, event: AuditEvent) {
    if let Some(sink) = audit {
        sink.lock().record(event);
    }
}
