//! Instructor double-booking detection.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::slot::SlotStore;
use crate::util::{InstructorId, SlotId};

/// Two half-open intervals `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`. Touching endpoints do not conflict.
#[must_use]
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Checks a candidate time range against an instructor's existing slots.
///
/// Consulted only at slot-authoring time, never on the booking path.
pub struct ConflictDetector {
    slots: Arc<SlotStore>,
}

impl ConflictDetector {
    /// Create a detector over the given slot store.
    #[must_use]
    pub const fn new(slots: Arc<SlotStore>) -> Self {
        Self { slots }
    }

    /// Whether the instructor already has a non-cancelled slot overlapping
    /// `[start, end)`. `exclude` lets an edit-in-place skip itself.
    #[must_use]
    pub fn has_conflict(
        &self,
        instructor: InstructorId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<SlotId>,
    ) -> bool {
        self.slots
            .slots_for_instructor(instructor)
            .iter()
            .filter(|s| exclude != Some(s.id))
            .any(|s| intervals_overlap(start, end, s.start, s.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        assert!(!intervals_overlap(t(10, 0), t(11, 0), t(11, 0), t(12, 0)));
        assert!(!intervals_overlap(t(11, 0), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn partial_overlap_conflicts() {
        assert!(intervals_overlap(t(10, 0), t(11, 0), t(10, 30), t(11, 30)));
        assert!(intervals_overlap(t(10, 30), t(11, 30), t(10, 0), t(11, 0)));
    }

    #[test]
    fn containment_conflicts() {
        assert!(intervals_overlap(t(9, 0), t(12, 0), t(10, 0), t(11, 0)));
        assert!(intervals_overlap(t(10, 0), t(11, 0), t(9, 0), t(12, 0)));
    }

    #[test]
    fn disjoint_does_not_conflict() {
        assert!(!intervals_overlap(t(8, 0), t(9, 0), t(10, 0), t(11, 0)));
    }
}
