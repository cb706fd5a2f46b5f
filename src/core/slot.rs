//! Slot definitions and the capacity-authoritative slot store.
//!
//! All seat accounting for a slot happens under that slot's own mutex, so
//! concurrent reservations against one slot serialize while different slots
//! never contend. The outer map lock is held only long enough to look up the
//! per-slot handle.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::core::BookingError;
use crate::util::{InstructorId, SlotId};

/// Lifecycle status of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Seats remain; bookings accepted.
    Available,
    /// Every seat is confirmed or reserved.
    Full,
    /// Slot withdrawn; no reservations accepted.
    Cancelled,
}

/// A bookable time window with finite seat capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Slot identifier.
    pub id: SlotId,
    /// Activity this slot is an instance of.
    pub activity: crate::util::ActivityId,
    /// Assigned instructor, if any.
    pub instructor: Option<InstructorId>,
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
    /// Maximum seats, always > 0.
    pub capacity: u32,
    /// Price per attendee in minor currency units.
    pub price_minor: u64,
    /// Current lifecycle status.
    pub status: SlotStatus,
    /// Whether a full slot queues further bookings instead of rejecting.
    pub waitlist_enabled: bool,
}

/// Point-in-time view of a slot's seat accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    /// Configured seat capacity.
    pub capacity: u32,
    /// Seats held by confirmed bookings.
    pub confirmed: u32,
    /// Seats held by bookings awaiting payment.
    pub reserved: u32,
}

impl CapacitySnapshot {
    /// Seats still open for reservation.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.capacity
            .saturating_sub(self.confirmed)
            .saturating_sub(self.reserved)
    }
}

/// Typed rejection for a seat reservation attempt.
///
/// These are expected outcomes, not faults; callers branch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatRejection {
    /// Remaining capacity is insufficient for the requested count.
    Full,
    /// No slot with the given id.
    NotFound,
    /// Slot has been cancelled.
    Cancelled,
}

/// Which accounting bucket a seat release comes out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeatBucket {
    Reserved,
    Confirmed,
}

struct SlotState {
    slot: Slot,
    confirmed: u32,
    reserved: u32,
}

impl SlotState {
    fn snapshot(&self) -> CapacitySnapshot {
        CapacitySnapshot {
            capacity: self.slot.capacity,
            confirmed: self.confirmed,
            reserved: self.reserved,
        }
    }

    /// Re-derive Available/Full from the counters; never touches Cancelled.
    fn refresh_status(&mut self) {
        if self.slot.status == SlotStatus::Cancelled {
            return;
        }
        self.slot.status = if self.confirmed + self.reserved >= self.slot.capacity {
            SlotStatus::Full
        } else {
            SlotStatus::Available
        };
    }
}

/// Owner of slot definitions and the authoritative seat counters.
pub struct SlotStore {
    slots: RwLock<HashMap<SlotId, Arc<Mutex<SlotState>>>>,
}

impl SlotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn handle(&self, slot_id: SlotId) -> Option<Arc<Mutex<SlotState>>> {
        self.slots.read().get(&slot_id).cloned()
    }

    /// Insert a slot definition. Counters start at zero.
    pub fn insert(&self, slot: Slot) -> SlotId {
        let id = slot.id;
        let state = SlotState {
            slot,
            confirmed: 0,
            reserved: 0,
        };
        self.slots
            .write()
            .insert(id, Arc::new(Mutex::new(state)));
        tracing::debug!(slot = %id, "slot inserted");
        id
    }

    /// Fetch a copy of the slot definition.
    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> Option<Slot> {
        self.handle(slot_id).map(|h| h.lock().slot.clone())
    }

    /// Atomically reserve `count` seats, or reject without partial effect.
    ///
    /// On success the returned snapshot reflects the post-reservation state.
    /// Flips the slot to `Full` when the reservation exhausts capacity.
    pub fn reserve_seats(
        &self,
        slot_id: SlotId,
        count: u32,
    ) -> Result<CapacitySnapshot, SeatRejection> {
        let handle = self.handle(slot_id).ok_or(SeatRejection::NotFound)?;
        let mut state = handle.lock();
        if state.slot.status == SlotStatus::Cancelled {
            return Err(SeatRejection::Cancelled);
        }
        let taken = state.confirmed + state.reserved;
        // Overflow-safe for arbitrary counts on the public surface.
        if state.slot.capacity.saturating_sub(taken) < count {
            tracing::debug!(slot = %slot_id, count, taken, "reservation rejected: full");
            return Err(SeatRejection::Full);
        }
        state.reserved += count;
        state.refresh_status();
        tracing::info!(slot = %slot_id, count, "seats reserved");
        Ok(state.snapshot())
    }

    /// Return `count` reserved (pending-payment) seats to the pool.
    pub fn release_seats(&self, slot_id: SlotId, count: u32) {
        self.release(slot_id, count, SeatBucket::Reserved);
    }

    /// Return `count` confirmed seats to the pool (cancellation/refund).
    pub fn release_confirmed_seats(&self, slot_id: SlotId, count: u32) {
        self.release(slot_id, count, SeatBucket::Confirmed);
    }

    fn release(&self, slot_id: SlotId, count: u32, bucket: SeatBucket) {
        let Some(handle) = self.handle(slot_id) else {
            tracing::warn!(slot = %slot_id, "release against unknown slot ignored");
            return;
        };
        let mut state = handle.lock();
        let counter = match bucket {
            SeatBucket::Reserved => &mut state.reserved,
            SeatBucket::Confirmed => &mut state.confirmed,
        };
        if *counter < count {
            tracing::warn!(slot = %slot_id, count, held = *counter, "release underflow clamped");
        }
        *counter = counter.saturating_sub(count);
        state.refresh_status();
        tracing::info!(slot = %slot_id, count, "seats released");
    }

    /// Move `count` seats from the reserved bucket to confirmed.
    ///
    /// The total held does not change, so this can never violate capacity.
    pub fn confirm_seats(&self, slot_id: SlotId, count: u32) {
        let Some(handle) = self.handle(slot_id) else {
            tracing::warn!(slot = %slot_id, "confirm against unknown slot ignored");
            return;
        };
        let mut state = handle.lock();
        if state.reserved < count {
            tracing::warn!(slot = %slot_id, count, reserved = state.reserved, "confirm underflow clamped");
        }
        let moved = state.reserved.min(count);
        state.reserved -= moved;
        state.confirmed += moved;
        tracing::info!(slot = %slot_id, count = moved, "seats confirmed");
    }

    /// Current capacity accounting for a slot.
    #[must_use]
    pub fn capacity_snapshot(&self, slot_id: SlotId) -> Option<CapacitySnapshot> {
        self.handle(slot_id).map(|h| h.lock().snapshot())
    }

    /// Change a slot's capacity.
    ///
    /// Rejected if the new capacity would fall below seats already held, so
    /// an administrative edit can never retroactively break the invariant.
    pub fn update_capacity(&self, slot_id: SlotId, capacity: u32) -> Result<(), BookingError> {
        if capacity == 0 {
            return Err(BookingError::InvalidRequest(
                "capacity must be greater than 0".into(),
            ));
        }
        let handle = self.handle(slot_id).ok_or(BookingError::NotFound)?;
        let mut state = handle.lock();
        if capacity < state.confirmed + state.reserved {
            return Err(BookingError::CapacityExceeded);
        }
        state.slot.capacity = capacity;
        state.refresh_status();
        Ok(())
    }

    /// Change a slot's time window. Conflict checking is the caller's job
    /// (see [`SlotAuthoring::update_slot_times`](crate::core::authoring::SlotAuthoring)).
    pub(crate) fn update_times(
        &self,
        slot_id: SlotId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let handle = self.handle(slot_id).ok_or(BookingError::NotFound)?;
        let mut state = handle.lock();
        state.slot.start = start;
        state.slot.end = end;
        Ok(())
    }

    /// Mark a slot cancelled. Existing bookings are resolved by the caller.
    pub fn cancel_slot(&self, slot_id: SlotId) -> Result<Slot, BookingError> {
        let handle = self.handle(slot_id).ok_or(BookingError::NotFound)?;
        let mut state = handle.lock();
        state.slot.status = SlotStatus::Cancelled;
        tracing::info!(slot = %slot_id, "slot cancelled");
        Ok(state.slot.clone())
    }

    /// All non-cancelled slots assigned to an instructor.
    #[must_use]
    pub fn slots_for_instructor(&self, instructor: InstructorId) -> Vec<Slot> {
        let handles: Vec<_> = self.slots.read().values().cloned().collect();
        handles
            .iter()
            .map(|h| h.lock().slot.clone())
            .filter(|s| s.instructor == Some(instructor) && s.status != SlotStatus::Cancelled)
            .collect()
    }
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}
