//! Administrative slot authoring: single creation, bulk recurring
//! generation, and conflict-checked edits.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::audit::{self, SharedAuditSink};
use crate::core::conflict::ConflictDetector;
use crate::core::slot::{Slot, SlotStatus, SlotStore};
use crate::core::BookingError;
use crate::util::{ActivityId, InstructorId, SlotId};

/// Definition of a slot to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlot {
    /// Activity the slot belongs to.
    pub activity: ActivityId,
    /// Assigned instructor, if any.
    pub instructor: Option<InstructorId>,
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
    /// Seat capacity, > 0.
    pub capacity: u32,
    /// Price per attendee in minor units.
    pub price_minor: u64,
    /// Whether a full slot queues bookings.
    pub waitlist_enabled: bool,
}

/// A daily time window used by bulk generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start time of day.
    pub start: NaiveTime,
    /// Window end time of day.
    pub end: NaiveTime,
}

/// Bulk recurring-slot generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSlotRequest {
    /// First date of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the range (inclusive).
    pub end_date: NaiveDate,
    /// Weekdays to generate on.
    pub weekdays: Vec<Weekday>,
    /// Daily time windows, one candidate slot each.
    pub windows: Vec<TimeWindow>,
    /// Activity for every generated slot.
    pub activity: ActivityId,
    /// Instructor for every generated slot, if any.
    pub instructor: Option<InstructorId>,
    /// Capacity for every generated slot.
    pub capacity: u32,
    /// Price per attendee in minor units.
    pub price_minor: u64,
    /// Waitlist flag for every generated slot.
    pub waitlist_enabled: bool,
}

/// Why a bulk candidate was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Instructor already has an overlapping slot.
    SchedulingConflict,
    /// Window start is not before its end.
    InvalidWindow,
}

/// A bulk candidate that was not created, with its reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCandidate {
    /// Candidate date.
    pub date: NaiveDate,
    /// Candidate window.
    pub window: TimeWindow,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Per-candidate outcome report of a bulk generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSlotOutcome {
    /// Slots that were created.
    pub created: Vec<SlotId>,
    /// Candidates skipped, each with a reason. A skip never aborts the rest
    /// of the batch.
    pub skipped: Vec<SkippedCandidate>,
}

/// Authoring surface over the slot store and conflict detector.
pub struct SlotAuthoring {
    slots: Arc<SlotStore>,
    conflicts: ConflictDetector,
    audit: Option<SharedAuditSink>,
}

impl SlotAuthoring {
    /// Wire up the authoring surface.
    pub fn new(
        slots: Arc<SlotStore>,
        conflicts: ConflictDetector,
        audit: Option<SharedAuditSink>,
    ) -> Self {
        Self {
            slots,
            conflicts,
            audit,
        }
    }

    /// Create a single slot, conflict-checked against the instructor's
    /// existing schedule.
    pub fn create_slot(&self, new: &NewSlot) -> Result<SlotId, BookingError> {
        if new.start >= new.end {
            return Err(BookingError::InvalidRequest(
                "slot start must be before end".into(),
            ));
        }
        if new.capacity == 0 {
            return Err(BookingError::InvalidRequest(
                "capacity must be greater than 0".into(),
            ));
        }
        if let Some(instructor) = new.instructor {
            if self
                .conflicts
                .has_conflict(instructor, new.start, new.end, None)
            {
                return Err(BookingError::SchedulingConflict);
            }
        }
        let slot = Slot {
            id: SlotId::new(),
            activity: new.activity,
            instructor: new.instructor,
            start: new.start,
            end: new.end,
            capacity: new.capacity,
            price_minor: new.price_minor,
            status: SlotStatus::Available,
            waitlist_enabled: new.waitlist_enabled,
        };
        let id = self.slots.insert(slot);
        audit::record(
            self.audit.as_ref(),
            audit::build_audit_event("create_slot", None, Some(id.to_string()), "admin", None),
        );
        Ok(id)
    }

    /// Expand and create recurring slots across a date range.
    ///
    /// Each (date, window) candidate is checked independently; a conflict
    /// skips that candidate and reports it without aborting the batch.
    /// Accepted candidates are inserted before the next one is checked, so
    /// overlapping candidates within the same batch are caught the same way
    /// as conflicts with pre-existing slots.
    pub fn create_slots_bulk(&self, req: &BulkSlotRequest) -> Result<BulkSlotOutcome, BookingError> {
        if req.start_date > req.end_date {
            return Err(BookingError::InvalidRequest(
                "start_date must not be after end_date".into(),
            ));
        }
        if req.capacity == 0 {
            return Err(BookingError::InvalidRequest(
                "capacity must be greater than 0".into(),
            ));
        }

        let mut outcome = BulkSlotOutcome {
            created: Vec::new(),
            skipped: Vec::new(),
        };

        let mut date = req.start_date;
        while date <= req.end_date {
            if req.weekdays.contains(&date.weekday()) {
                for window in &req.windows {
                    self.apply_candidate(req, date, *window, &mut outcome);
                }
            }
            let Some(next) = date.succ_opt() else { break };
            date = next;
        }

        tracing::info!(
            created = outcome.created.len(),
            skipped = outcome.skipped.len(),
            "bulk slot generation finished"
        );
        Ok(outcome)
    }

    fn apply_candidate(
        &self,
        req: &BulkSlotRequest,
        date: NaiveDate,
        window: TimeWindow,
        outcome: &mut BulkSlotOutcome,
    ) {
        if window.start >= window.end {
            outcome.skipped.push(SkippedCandidate {
                date,
                window,
                reason: SkipReason::InvalidWindow,
            });
            return;
        }
        let start = date.and_time(window.start).and_utc();
        let end = date.and_time(window.end).and_utc();

        if let Some(instructor) = req.instructor {
            if self.conflicts.has_conflict(instructor, start, end, None) {
                tracing::debug!(%date, "bulk candidate skipped: scheduling conflict");
                audit::record(
                    self.audit.as_ref(),
                    audit::build_audit_event(
                        "skip",
                        None,
                        None,
                        "admin",
                        Some(format!("{date} {}-{}", window.start, window.end)),
                    ),
                );
                outcome.skipped.push(SkippedCandidate {
                    date,
                    window,
                    reason: SkipReason::SchedulingConflict,
                });
                return;
            }
        }

        let slot = Slot {
            id: SlotId::new(),
            activity: req.activity,
            instructor: req.instructor,
            start,
            end,
            capacity: req.capacity,
            price_minor: req.price_minor,
            status: SlotStatus::Available,
            waitlist_enabled: req.waitlist_enabled,
        };
        outcome.created.push(self.slots.insert(slot));
    }

    /// Move a slot to a new time window, checking conflicts against
    /// everything except the slot itself.
    pub fn update_slot_times(
        &self,
        slot_id: SlotId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        if start >= end {
            return Err(BookingError::InvalidRequest(
                "slot start must be before end".into(),
            ));
        }
        let slot = self.slots.get(slot_id).ok_or(BookingError::NotFound)?;
        if let Some(instructor) = slot.instructor {
            if self
                .conflicts
                .has_conflict(instructor, start, end, Some(slot_id))
            {
                return Err(BookingError::SchedulingConflict);
            }
        }
        self.slots.update_times(slot_id, start, end)
    }
}
