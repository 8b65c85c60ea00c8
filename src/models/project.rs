//! Project model.
//!
//! A project is one presentation that needs a classroom, a timeslot,
//! its responsible (supervising) instructor and, for final presentations,
//! at least one jury member.

use serde::{Deserialize, Serialize};

/// Presentation kind.
///
/// Final presentations must be evaluated by a jury; interim
/// presentations may be held by the responsible instructor alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// End-of-term presentation (jury required).
    Final,
    /// Progress presentation.
    Interim,
}

/// A project to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: String,
    /// Presentation kind.
    pub kind: ProjectKind,
    /// Whether this is a makeup presentation (scheduled after regular ones).
    #[serde(default)]
    pub is_makeup: bool,
    /// Supervising instructor. Always first in the assignment's instructor list.
    pub responsible_instructor_id: String,
}

impl Project {
    /// Creates a new project.
    pub fn new(
        id: impl Into<String>,
        kind: ProjectKind,
        responsible_instructor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            is_makeup: false,
            responsible_instructor_id: responsible_instructor_id.into(),
        }
    }

    /// Creates a final presentation.
    pub fn final_presentation(
        id: impl Into<String>,
        responsible_instructor_id: impl Into<String>,
    ) -> Self {
        Self::new(id, ProjectKind::Final, responsible_instructor_id)
    }

    /// Creates an interim presentation.
    pub fn interim(id: impl Into<String>, responsible_instructor_id: impl Into<String>) -> Self {
        Self::new(id, ProjectKind::Interim, responsible_instructor_id)
    }

    /// Marks the project as a makeup presentation.
    pub fn as_makeup(mut self) -> Self {
        self.is_makeup = true;
        self
    }

    /// Whether the project needs at least one jury member.
    #[inline]
    pub fn requires_jury(&self) -> bool {
        self.kind == ProjectKind::Final
    }

    /// Placement rank inside an instructor's run.
    ///
    /// Regular before makeup, final before interim.
    pub(crate) fn placement_rank(&self) -> u8 {
        let makeup = u8::from(self.is_makeup) * 2;
        let interim = u8::from(self.kind == ProjectKind::Interim);
        makeup + interim
    }
}
