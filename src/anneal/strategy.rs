//! Candidate proposal strategies.
//!
//! A strategy turns the current schedule into a new candidate. The
//! evaluator, resolver and compactor never depend on which strategy is in
//! use, so strategies can be swapped freely.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::construction::FairnessBuilder;
use crate::models::{Problem, Schedule};

/// Produces candidate schedules for the annealer.
pub trait ProposeCandidate: Send + Sync {
    /// Strategy name, for logs.
    fn name(&self) -> &str;

    /// Proposes a candidate derived from `current`.
    ///
    /// `heat` is the normalized temperature in `[0, 1]`; 1 is hottest.
    fn propose(&self, problem: &Problem, current: &Schedule, heat: f64, rng: &mut StdRng)
        -> Schedule;
}

/// Re-runs the fairness construction with randomness equal to `heat`.
///
/// Hot iterations explore random orderings and classroom choices; cold
/// ones collapse to the deterministic earliest-free-slot construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnealedConstruction;

impl ProposeCandidate for AnnealedConstruction {
    fn name(&self) -> &str {
        "annealed-construction"
    }

    fn propose(
        &self,
        problem: &Problem,
        _current: &Schedule,
        heat: f64,
        rng: &mut StdRng,
    ) -> Schedule {
        FairnessBuilder::new(problem)
            .build_randomized(heat, rng)
            .schedule
    }
}

/// Moves one random assignment to a random slot that hosts it without a
/// double booking.
///
/// Leaves the schedule unchanged when no such slot exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelocationMove;

impl ProposeCandidate for RelocationMove {
    fn name(&self) -> &str {
        "relocation"
    }

    fn propose(
        &self,
        problem: &Problem,
        current: &Schedule,
        _heat: f64,
        rng: &mut StdRng,
    ) -> Schedule {
        let mut candidate = current.clone_for_candidate();
        if candidate.is_empty() {
            return candidate;
        }
        let idx = rng.random_range(0..candidate.len());
        let Some(assignment) = candidate.get(idx) else {
            return candidate;
        };

        let mut free = Vec::new();
        for timeslot in problem.timeslots() {
            for classroom in problem.classrooms() {
                let same = classroom.id == assignment.classroom_id
                    && timeslot.id == assignment.timeslot_id;
                if !same
                    && candidate.can_host(
                        &classroom.id,
                        &timeslot.id,
                        &assignment.instructor_ids,
                        Some(idx),
                    )
                {
                    free.push((classroom.id.clone(), timeslot.id.clone()));
                }
            }
        }

        if let Some((classroom_id, timeslot_id)) = free.choose(rng).cloned() {
            candidate.move_to(idx, classroom_id, timeslot_id);
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::detect_conflicts;
    use crate::models::{Classroom, Instructor, ProblemData, Project, Timeslot};
    use rand::SeedableRng;

    fn problem() -> Problem {
        Problem::new(ProblemData::new(
            vec![
                Project::final_presentation("A1", "A"),
                Project::interim("A2", "A"),
                Project::final_presentation("B1", "B"),
            ],
            vec![Instructor::faculty("A"), Instructor::faculty("B")],
            vec![Classroom::new("C1"), Classroom::new("C2")],
            vec![
                Timeslot::new("T1", "09:00"),
                Timeslot::new("T2", "10:00"),
                Timeslot::new("T3", "11:00"),
            ],
        ))
        .unwrap()
    }

    #[test]
    fn test_cold_construction_is_deterministic() {
        let p = problem();
        let current = Schedule::new();
        let mut rng = StdRng::seed_from_u64(1);
        let a = AnnealedConstruction.propose(&p, &current, 0.0, &mut rng);
        let b = FairnessBuilder::new(&p).build().schedule;
        assert_eq!(a, b);
    }

    #[test]
    fn test_relocation_moves_one_assignment_without_new_conflicts() {
        let p = problem();
        let current = FairnessBuilder::new(&p).build().schedule;
        assert!(detect_conflicts(&current).is_empty());

        let mut rng = StdRng::seed_from_u64(11);
        let candidate = RelocationMove.propose(&p, &current, 1.0, &mut rng);

        let changed = current
            .assignments()
            .iter()
            .zip(candidate.assignments())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
        assert!(detect_conflicts(&candidate).is_empty());
    }

    #[test]
    fn test_relocation_on_empty_schedule() {
        let p = problem();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(RelocationMove
            .propose(&p, &Schedule::new(), 1.0, &mut rng)
            .is_empty());
    }
}
