//! Conflict model.
//!
//! A conflict is a detected violation of an occupancy invariant. Conflicts
//! are scored, never rejected: the evaluator adds a penalty proportional
//! to severity, and unresolved ones are reported in the run result.

use serde::{Deserialize, Serialize};

/// Classification of occupancy conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// An instructor takes part in two assignments at the same timeslot.
    InstructorDoubleBooking,
    /// Two assignments share a (classroom, timeslot) slot.
    ClassroomDoubleBooking,
    /// A timeslot holds more assignments than there are classrooms.
    TimeslotOverflow,
}

/// A detected conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Type of conflict.
    pub kind: ConflictKind,
    /// Offending instructor or classroom ID (empty for timeslot overflow).
    pub resource_id: String,
    /// Offending timeslot ID.
    pub timeslot_id: String,
    /// Projects of the implicated assignments.
    pub project_ids: Vec<String>,
    /// Severity (0-100, higher = worse).
    pub severity: u32,
}

/// Severity of a classroom double booking.
pub const CLASSROOM_SEVERITY: u32 = 95;
/// Severity of double-booking an instructor who is responsible in at least one of the assignments.
pub const RESPONSIBLE_SEVERITY: u32 = 90;
/// Severity of double-booking an instructor who only sits on juries.
pub const JURY_SEVERITY: u32 = 70;
/// Severity of a timeslot overflow.
pub const OVERFLOW_SEVERITY: u32 = 60;

impl Conflict {
    /// Creates a classroom double-booking conflict.
    pub fn classroom_double_booking(
        classroom_id: impl Into<String>,
        timeslot_id: impl Into<String>,
        project_ids: Vec<String>,
    ) -> Self {
        Self {
            kind: ConflictKind::ClassroomDoubleBooking,
            resource_id: classroom_id.into(),
            timeslot_id: timeslot_id.into(),
            project_ids,
            severity: CLASSROOM_SEVERITY,
        }
    }

    /// Creates an instructor double-booking conflict.
    pub fn instructor_double_booking(
        instructor_id: impl Into<String>,
        timeslot_id: impl Into<String>,
        project_ids: Vec<String>,
        responsible: bool,
    ) -> Self {
        Self {
            kind: ConflictKind::InstructorDoubleBooking,
            resource_id: instructor_id.into(),
            timeslot_id: timeslot_id.into(),
            project_ids,
            severity: if responsible {
                RESPONSIBLE_SEVERITY
            } else {
                JURY_SEVERITY
            },
        }
    }

    /// Creates a timeslot overflow conflict.
    pub fn timeslot_overflow(timeslot_id: impl Into<String>, project_ids: Vec<String>) -> Self {
        Self {
            kind: ConflictKind::TimeslotOverflow,
            resource_id: String::new(),
            timeslot_id: timeslot_id.into(),
            project_ids,
            severity: OVERFLOW_SEVERITY,
        }
    }

    /// Number of assignments beyond the first at the conflicting locus.
    pub fn excess(&self) -> usize {
        self.project_ids.len().saturating_sub(1)
    }

    /// Severity-weighted size, used for penalties.
    pub fn weight(&self) -> f64 {
        f64::from(self.severity) / 100.0 * self.excess().max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_factories() {
        let c = Conflict::classroom_double_booking("C1", "T1", vec!["P1".into(), "P2".into()]);
        assert_eq!(c.kind, ConflictKind::ClassroomDoubleBooking);
        assert_eq!(c.severity, CLASSROOM_SEVERITY);
        assert_eq!(c.excess(), 1);

        let r = Conflict::instructor_double_booking("I1", "T1", vec!["P1".into(), "P2".into()], true);
        let j = Conflict::instructor_double_booking("I2", "T1", vec!["P1".into(), "P2".into()], false);
        assert!(r.severity > j.severity);

        let o = Conflict::timeslot_overflow("T1", vec!["P1".into(), "P2".into(), "P3".into()]);
        assert!(o.resource_id.is_empty());
        assert_eq!(o.excess(), 2);
    }

    #[test]
    fn test_conflict_weight() {
        let c = Conflict::classroom_double_booking(
            "C1",
            "T1",
            vec!["P1".into(), "P2".into(), "P3".into()],
        );
        assert!((c.weight() - 1.9).abs() < 1e-12);
    }
}
