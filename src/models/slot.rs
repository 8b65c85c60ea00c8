//! Classroom and timeslot models.
//!
//! A (classroom, timeslot) pair is the unit of placement. Timeslots carry
//! a wall-clock start; their chronological `order` is derived once when
//! the catalog is built.

use serde::{Deserialize, Serialize};

/// A classroom where presentations are held.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique classroom identifier.
    pub id: String,
}

impl Classroom {
    /// Creates a new classroom.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A presentation timeslot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeslot {
    /// Unique timeslot identifier.
    pub id: String,
    /// Wall-clock start time, `"HH:MM"` (24h).
    pub start: String,
    /// Chronological ordinal (0 = earliest). Assigned by [`Problem`](super::Problem).
    #[serde(default)]
    pub order: usize,
}

impl Timeslot {
    /// Creates a timeslot starting at the given wall-clock time.
    pub fn new(id: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: start.into(),
            order: 0,
        }
    }

    /// Start time in minutes after midnight, if `start` is well-formed.
    pub fn start_minutes(&self) -> Option<u32> {
        parse_wall_clock(&self.start)
    }
}

/// Parses `"HH:MM"` (or `"H:MM"`) into minutes after midnight.
pub fn parse_wall_clock(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}
