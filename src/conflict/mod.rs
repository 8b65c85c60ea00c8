//! Conflict detection and repair.
//!
//! Detection reports every occupancy violation of a schedule. Resolution
//! tries to repair them without ever rejecting a schedule: whatever it
//! cannot fix remains in place, is scored by the evaluator, and surfaces
//! as a residual conflict in the run result.
//!
//! # Kinds
//!
//! | Kind | Locus | Severity |
//! |------|-------|----------|
//! | ClassroomDoubleBooking | classroom × timeslot | 95 |
//! | InstructorDoubleBooking | instructor × timeslot | 90 (responsible) / 70 (jury) |
//! | TimeslotOverflow | timeslot | 60 |
//!
//! Overflow capacity is the number of classrooms the schedule uses, so an
//! overflow is an extra charge on a timeslot that already has a classroom
//! double booking.

mod detect;
mod resolve;

pub use detect::detect_conflicts;
pub use resolve::{ConflictResolver, Resolution, ResolveContext};
