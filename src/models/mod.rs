//! Jury scheduling domain models.
//!
//! Catalog entities (`Project`, `Instructor`, `Classroom`, `Timeslot`) are
//! created once from [`ProblemData`] and never mutated. `Schedule`s and
//! their `Assignment`s are created by construction, mutated by the
//! optimizer and compactor, and dropped when a run ends.
//!
//! # Mapping
//!
//! | u-jury | Meaning |
//! |--------|---------|
//! | Project | One presentation to hold |
//! | Instructor | Supervisor or jury member |
//! | Classroom × Timeslot | One placement slot |
//! | Assignment | Project → slot + ordered instructors |
//! | Conflict | Detected occupancy violation |

mod conflict;
mod instructor;
mod problem;
mod project;
mod schedule;
mod slot;

pub use conflict::{
    Conflict, ConflictKind, CLASSROOM_SEVERITY, JURY_SEVERITY, OVERFLOW_SEVERITY,
    RESPONSIBLE_SEVERITY,
};
pub use instructor::{Instructor, InstructorCategory};
pub use problem::{Problem, ProblemData};
pub use project::{Project, ProjectKind};
pub use schedule::{Assignment, Schedule, SlotOccupied};
pub use slot::{parse_wall_clock, Classroom, Timeslot};
