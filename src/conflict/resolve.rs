//! Conflict resolution.
//!
//! Conflicts are processed in descending severity. For each, one offending
//! assignment is relocated within an adaptive timeslot neighborhood, then
//! anywhere; if that fails and the conflict is an instructor double
//! booking, the instructor is demoted from a jury they sit on. Whatever
//! cannot be repaired stays in the schedule and is returned as residual.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::detect_conflicts;
use crate::models::{Conflict, ConflictKind, Problem, Schedule};

/// Search state that shapes the relocation neighborhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveContext {
    /// Current optimizer temperature.
    pub temperature: f64,
    /// Temperature at the start of the run.
    pub initial_temperature: f64,
    /// Fraction of the iteration budget consumed (0.0..=1.0).
    pub progress: f64,
}

/// Outcome of a resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The repaired schedule.
    pub schedule: Schedule,
    /// Assignments moved to another slot.
    pub relocated: usize,
    /// Jury members removed from assignments.
    pub demoted: usize,
    /// Conflicts still present after the pass.
    pub residual: Vec<Conflict>,
}

/// Repairs conflicts by relocation and jury demotion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ResolveContext {
    /// Context for a cold, finished search (smallest neighborhood).
    pub fn settled() -> Self {
        Self {
            temperature: 0.0,
            initial_temperature: 1.0,
            progress: 1.0,
        }
    }

    /// Neighborhood radius, in timeslots.
    ///
    /// Grows with temperature and shrinks as the run matures; never below 1.
    pub fn radius(&self, timeslot_count: usize) -> usize {
        let heat = if self.initial_temperature > 0.0 {
            (self.temperature / self.initial_temperature).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let youth = (1.0 - self.progress).clamp(0.0, 1.0);
        let radius = (heat * youth * timeslot_count as f64).ceil() as usize;
        radius.max(1)
    }
}

impl ConflictResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Attempts to clear `conflicts` from `schedule`.
    ///
    /// Severity ties are ordered by `rng`, so a fixed seed reproduces the
    /// same repairs.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        problem: &Problem,
        mut schedule: Schedule,
        conflicts: Vec<Conflict>,
        context: &ResolveContext,
        rng: &mut R,
    ) -> Resolution {
        let mut ordered = conflicts;
        ordered.shuffle(rng);
        ordered.sort_by(|a, b| b.severity.cmp(&a.severity));

        let radius = context.radius(problem.timeslots().len());
        let mut relocated = 0;
        let mut demoted = 0;

        for conflict in &ordered {
            let implicated = locus_indices(&schedule, conflict);
            if implicated.len() < 2 {
                continue;
            }

            // The earliest-inserted assignment keeps its place.
            let moved = implicated[1..].iter().rev().find_map(|&idx| {
                find_free_slot(problem, &schedule, idx, radius).map(|slot| (idx, slot))
            });
            if let Some((idx, (classroom_id, timeslot_id))) = moved {
                schedule.move_to(idx, classroom_id, timeslot_id);
                relocated += 1;
                continue;
            }

            if conflict.kind == ConflictKind::InstructorDoubleBooking
                && demote(&mut schedule, &implicated, &conflict.resource_id)
            {
                demoted += 1;
                continue;
            }

            debug!(
                kind = ?conflict.kind,
                resource = %conflict.resource_id,
                timeslot = %conflict.timeslot_id,
                "conflict left unresolved"
            );
        }

        let residual = detect_conflicts(&schedule);
        Resolution {
            schedule,
            relocated,
            demoted,
            residual,
        }
    }
}

/// Current assignment indices at a conflict's locus, ascending.
fn locus_indices(schedule: &Schedule, conflict: &Conflict) -> Vec<usize> {
    let mut indices = match conflict.kind {
        ConflictKind::ClassroomDoubleBooking => schedule
            .at_slot(&conflict.resource_id, &conflict.timeslot_id)
            .to_vec(),
        ConflictKind::InstructorDoubleBooking => schedule
            .instructor_at(&conflict.resource_id, &conflict.timeslot_id)
            .to_vec(),
        ConflictKind::TimeslotOverflow => {
            let capacity = {
                let mut rooms: Vec<&str> =
                    schedule.occupied_slots().map(|(room, _, _)| room).collect();
                rooms.sort_unstable();
                rooms.dedup();
                rooms.len()
            };
            let in_slot: Vec<usize> = schedule
                .assignments()
                .iter()
                .enumerate()
                .filter(|(_, a)| a.timeslot_id == conflict.timeslot_id)
                .map(|(i, _)| i)
                .collect();
            if in_slot.len() > capacity {
                in_slot
            } else {
                Vec::new()
            }
        }
    };
    indices.sort_unstable();
    indices
}

/// Finds a conflict-free slot for assignment `idx`.
///
/// Searches timeslots within `radius` of the current one (nearest first,
/// earlier before later), then falls back to a full chronological scan.
fn find_free_slot(
    problem: &Problem,
    schedule: &Schedule,
    idx: usize,
    radius: usize,
) -> Option<(String, String)> {
    let assignment = schedule.get(idx)?;
    let fits = |order: usize| -> Option<(String, String)> {
        let timeslot = problem.timeslot_at(order)?;
        problem.classrooms().iter().find_map(|room| {
            let same = room.id == assignment.classroom_id && timeslot.id == assignment.timeslot_id;
            (!same
                && schedule.can_host(&room.id, &timeslot.id, &assignment.instructor_ids, Some(idx)))
            .then(|| (room.id.clone(), timeslot.id.clone()))
        })
    };

    if let Some(current) = problem.timeslot_order(&assignment.timeslot_id) {
        for distance in 0..=radius {
            let earlier = current.checked_sub(distance);
            let later = (distance > 0).then_some(current + distance);
            for order in [earlier, later].into_iter().flatten() {
                if let Some(slot) = fits(order) {
                    return Some(slot);
                }
            }
        }
    }

    (0..problem.timeslots().len()).find_map(fits)
}

/// Removes `instructor_id` from the jury of one implicated assignment.
///
/// Assignments that keep another jury member are preferred.
fn demote(schedule: &mut Schedule, implicated: &[usize], instructor_id: &str) -> bool {
    let mut candidates: Vec<usize> = implicated
        .iter()
        .rev()
        .copied()
        .filter(|&idx| {
            schedule
                .get(idx)
                .is_some_and(|a| a.jury().iter().any(|j| j == instructor_id))
        })
        .collect();
    if candidates.is_empty() {
        return false;
    }
    candidates.sort_by_key(|&idx| schedule.get(idx).map_or(true, |a| a.jury().len() <= 1));
    schedule.remove_jury_member(candidates[0], instructor_id)
}
