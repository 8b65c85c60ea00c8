//! Fairness-paired construction heuristic.
//!
//! # Algorithm
//!
//! 1. Group projects by responsible instructor (regular before makeup,
//!    final before interim).
//! 2. Sort instructors by project count, descending, and split the list
//!    into an upper and a lower half. Instructor `i` of the upper half is
//!    paired with instructor `i` of the lower half; with an odd count the
//!    last (lightest) instructor works alone.
//! 3. For a pair (X, Y), pick one classroom and place X's projects there
//!    consecutively from the earliest slot where both are free, with Y on
//!    the jury of finals. Then place Y's projects with X as jury,
//!    continuing from the next slot.
//! 4. When the classroom runs out, scan the other classrooms cyclically,
//!    then let a substitute jury member stand in, then accept an
//!    instructor double booking in any free classroom slot.
//! 5. A project with no free classroom slot anywhere is left unassigned.
//!
//! With a randomness `p > 0`, each ordering decision and the pair's
//! classroom are drawn uniformly at random with probability `p`; with
//! `p = 0` the result is fully deterministic.
//!
//! # Complexity
//! O(P × C × T) worst case, where P=projects, C=classrooms, T=timeslots.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::slot::{SlotCandidate, SlotTier};
use crate::models::{Assignment, Problem, Project, Schedule};

/// Output of a construction pass.
#[derive(Debug, Clone)]
pub struct Construction {
    /// The constructed schedule.
    pub schedule: Schedule,
    /// Projects that found no free classroom slot.
    pub unassigned: Vec<String>,
    /// Sum of the fallback penalties of every placement.
    pub fallback_penalty: f64,
}

/// Builds initial schedules by pairing heavy and light instructors.
#[derive(Debug, Clone, Copy)]
pub struct FairnessBuilder<'a> {
    problem: &'a Problem,
}

impl<'a> FairnessBuilder<'a> {
    /// Creates a builder over a catalog.
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    /// Deterministic construction (earliest-free-slot everywhere).
    pub fn build(&self) -> Construction {
        self.assemble(Chance::<StdRng>::never())
    }

    /// Construction with each decision randomized with probability `randomness`.
    ///
    /// `randomness` is clamped to `[0, 1]`.
    pub fn build_randomized<R: Rng>(&self, randomness: f64, rng: &mut R) -> Construction {
        self.assemble(Chance::new(randomness, rng))
    }

    fn assemble<R: Rng>(&self, mut chance: Chance<'_, R>) -> Construction {
        let problem = self.problem;
        let mut groups: Vec<(&'a str, Vec<&'a Project>)> = problem
            .instructors()
            .iter()
            .map(|i| (i.id.as_str(), Vec::new()))
            .collect();
        for project in problem.projects() {
            if let Some(pos) = problem.instructor_position(&project.responsible_instructor_id) {
                groups[pos].1.push(project);
            }
        }
        for (_, projects) in &mut groups {
            projects.sort_by_key(|p| p.placement_rank());
            chance.shuffle(projects);
        }

        let mut ranking: Vec<usize> = (0..groups.len()).collect();
        ranking.sort_by(|&a, &b| groups[b].1.len().cmp(&groups[a].1.len()));
        chance.shuffle(&mut ranking);

        let half = ranking.len() / 2;
        let mut teams: Vec<(usize, Option<usize>)> = (0..half)
            .map(|i| (ranking[i], Some(ranking[half + i])))
            .collect();
        if ranking.len() % 2 == 1 {
            teams.push((ranking[2 * half], None));
        }
        chance.shuffle(&mut teams);

        let mut state = State::new(problem);
        for (x, y) in teams {
            let (x_id, x_projects) = &groups[x];
            let partner = y.map(|y| &groups[y]);
            if x_projects.is_empty() && partner.map_or(true, |(_, p)| p.is_empty()) {
                continue;
            }
            let y_id = partner.map(|(id, _)| *id);

            let classroom = chance
                .pick(problem.classrooms().len())
                .unwrap_or_else(|| state.opening_classroom(x_id, y_id));
            let mut cursor = Cursor {
                classroom,
                order: 0,
            };

            for project in x_projects {
                state.place(project, y_id, &mut cursor);
            }
            if let Some((_, y_projects)) = partner {
                for project in y_projects {
                    state.place(project, Some(*x_id), &mut cursor);
                }
            }
        }

        state.finish()
    }
}

/// Next slot to try in the current classroom.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    classroom: usize,
    order: usize,
}

struct State<'a> {
    problem: &'a Problem,
    schedule: Schedule,
    loads: Vec<usize>,
    unassigned: Vec<String>,
    fallback_penalty: f64,
}

impl<'a> State<'a> {
    fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            schedule: Schedule::new(),
            loads: vec![0; problem.instructors().len()],
            unassigned: Vec::new(),
            fallback_penalty: 0.0,
        }
    }

    fn finish(self) -> Construction {
        Construction {
            schedule: self.schedule,
            unassigned: self.unassigned,
            fallback_penalty: self.fallback_penalty,
        }
    }

    /// Classroom whose earliest slot free for the pair comes first.
    fn opening_classroom(&self, x: &str, y: Option<&str>) -> usize {
        let timeslots = self.problem.timeslots();
        self.problem
            .classrooms()
            .iter()
            .enumerate()
            .filter_map(|(room, classroom)| {
                timeslots
                    .iter()
                    .position(|t| {
                        self.schedule.is_slot_free(&classroom.id, &t.id)
                            && self.schedule.is_instructor_free(x, &t.id)
                            && y.map_or(true, |y| self.schedule.is_instructor_free(y, &t.id))
                    })
                    .map(|order| (order, room))
            })
            .min()
            .map_or(0, |(_, room)| room)
    }

    fn place(&mut self, project: &Project, partner: Option<&str>, cursor: &mut Cursor) {
        let Some(candidate) = self.find_slot(project, partner, *cursor) else {
            warn!(project = %project.id, "no free classroom slot left; project unassigned");
            self.unassigned.push(project.id.clone());
            return;
        };

        let classroom_id = self.problem.classrooms()[candidate.classroom].id.clone();
        let timeslot_id = self.problem.timeslots()[candidate.order].id.clone();
        if candidate.tier >= SlotTier::SubstituteJury {
            debug!(
                project = %project.id,
                tier = ?candidate.tier,
                classroom = %classroom_id,
                timeslot = %timeslot_id,
                "placed via fallback"
            );
        }

        self.fallback_penalty += candidate.score();
        for id in &candidate.instructor_ids {
            if let Some(pos) = self.problem.instructor_position(id) {
                self.loads[pos] += 1;
            }
        }
        self.schedule.push(Assignment {
            project_id: project.id.clone(),
            classroom_id,
            timeslot_id,
            instructor_ids: candidate.instructor_ids,
        });
        *cursor = Cursor {
            classroom: candidate.classroom,
            order: candidate.order + 1,
        };
    }

    fn find_slot(
        &self,
        project: &Project,
        partner: Option<&str>,
        cursor: Cursor,
    ) -> Option<SlotCandidate> {
        let rooms = self.problem.classrooms().len();
        let slots = self.problem.timeslots().len();
        let candidate = |classroom: usize, order: usize, instructor_ids, tier| SlotCandidate {
            classroom,
            order,
            instructor_ids,
            tier,
        };

        for order in cursor.order..slots {
            if let Some(ids) = self.staff(project, partner, cursor.classroom, order, false) {
                return Some(candidate(cursor.classroom, order, ids, SlotTier::Preferred));
            }
        }

        for step in 1..=rooms {
            let room = (cursor.classroom + step) % rooms;
            for order in 0..slots {
                if let Some(ids) = self.staff(project, partner, room, order, false) {
                    return Some(candidate(room, order, ids, SlotTier::Cyclic));
                }
            }
        }

        if project.requires_jury() && partner.is_some() {
            for order in 0..slots {
                for room in 0..rooms {
                    if let Some(ids) = self.staff(project, partner, room, order, true) {
                        return Some(candidate(room, order, ids, SlotTier::SubstituteJury));
                    }
                }
            }
        }

        for order in 0..slots {
            let timeslot = &self.problem.timeslots()[order].id;
            for room in 0..rooms {
                if self
                    .schedule
                    .is_slot_free(&self.problem.classrooms()[room].id, timeslot)
                {
                    let ids = self.shared_staff(project, partner);
                    return Some(candidate(room, order, ids, SlotTier::Shared));
                }
            }
        }

        None
    }

    /// Instructor list for a slot, if everyone on it is free there.
    fn staff(
        &self,
        project: &Project,
        partner: Option<&str>,
        room: usize,
        order: usize,
        allow_substitute: bool,
    ) -> Option<Vec<String>> {
        let timeslot = &self.problem.timeslots()[order].id;
        let classroom = &self.problem.classrooms()[room].id;
        let responsible = project.responsible_instructor_id.as_str();
        if !self.schedule.is_slot_free(classroom, timeslot)
            || !self.schedule.is_instructor_free(responsible, timeslot)
        {
            return None;
        }

        let mut ids = vec![responsible.to_string()];
        if project.requires_jury() {
            let jury = match partner.filter(|p| *p != responsible) {
                Some(p) if self.schedule.is_instructor_free(p, timeslot) => p.to_string(),
                Some(_) if !allow_substitute => return None,
                _ => self.substitute(responsible, Some(timeslot.as_str()))?,
            };
            ids.push(jury);
        }
        Some(ids)
    }

    /// Instructor list when double bookings are accepted.
    fn shared_staff(&self, project: &Project, partner: Option<&str>) -> Vec<String> {
        let responsible = project.responsible_instructor_id.as_str();
        let mut ids = vec![responsible.to_string()];
        if project.requires_jury() {
            let jury = partner
                .filter(|p| *p != responsible)
                .map(str::to_string)
                .or_else(|| self.substitute(responsible, None));
            ids.extend(jury);
        }
        ids
    }

    /// Least-loaded stand-in jury member, faculty first.
    ///
    /// With `timeslot` set, only instructors free at that timeslot qualify.
    fn substitute(&self, responsible: &str, timeslot: Option<&str>) -> Option<String> {
        self.problem
            .instructors()
            .iter()
            .enumerate()
            .filter(|(_, i)| i.id != responsible)
            .filter(|(_, i)| timeslot.map_or(true, |t| self.schedule.is_instructor_free(&i.id, t)))
            .min_by_key(|(pos, i)| (!i.is_faculty(), self.loads[*pos], *pos))
            .map(|(_, i)| i.id.clone())
    }
}

/// Random decisions taken with a fixed probability.
struct Chance<'r, R: Rng> {
    probability: f64,
    rng: Option<&'r mut R>,
}

impl<'r, R: Rng> Chance<'r, R> {
    fn never() -> Self {
        Self {
            probability: 0.0,
            rng: None,
        }
    }

    fn new(probability: f64, rng: &'r mut R) -> Self {
        Self {
            probability: if probability.is_finite() {
                probability.clamp(0.0, 1.0)
            } else {
                0.0
            },
            rng: Some(rng),
        }
    }

    fn roll(&mut self) -> bool {
        match self.rng.as_deref_mut() {
            Some(rng) if self.probability > 0.0 => rng.random_bool(self.probability),
            _ => false,
        }
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        if self.roll() {
            if let Some(rng) = self.rng.as_deref_mut() {
                items.shuffle(rng);
            }
        }
    }

    fn pick(&mut self, len: usize) -> Option<usize> {
        if len == 0 || !self.roll() {
            return None;
        }
        self.rng.as_deref_mut().map(|rng| rng.random_range(0..len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::detect_conflicts;
    use crate::models::{Classroom, Instructor, ProblemData, Timeslot};
    use rand::SeedableRng;

    fn timeslots(n: usize) -> Vec<Timeslot> {
        (0..n)
            .map(|k| Timeslot::new(format!("T{}", k + 1), format!("{:02}:00", 8 + k)))
            .collect()
    }

    fn rooms(n: usize) -> Vec<Classroom> {
        (1..=n).map(|k| Classroom::new(format!("C{k}"))).collect()
    }

    fn two_instructor_problem() -> Problem {
        Problem::new(ProblemData::new(
            vec![
                Project::final_presentation("X1", "X"),
                Project::final_presentation("X2", "X"),
                Project::interim("X3", "X"),
                Project::interim("Y1", "Y"),
            ],
            vec![Instructor::faculty("X"), Instructor::faculty("Y")],
            rooms(2),
            timeslots(3),
        ))
        .unwrap()
    }

    #[test]
    fn test_pair_places_consecutively() {
        let p = two_instructor_problem();
        let c = FairnessBuilder::new(&p).build();

        assert!(c.unassigned.is_empty());
        let xs: Vec<&Assignment> = ["X1", "X2", "X3"]
            .iter()
            .map(|id| c.schedule.assignment_for_project(id).unwrap())
            .collect();
        assert!(xs.iter().all(|a| a.classroom_id == "C1"));
        let slots: Vec<&str> = xs.iter().map(|a| a.timeslot_id.as_str()).collect();
        assert_eq!(slots, vec!["T1", "T2", "T3"]);
        assert_eq!(xs[0].instructor_ids, vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(xs[2].instructor_ids, vec!["X".to_string()]);

        // Y's interim goes to the other classroom, where Y is first free.
        let y = c.schedule.assignment_for_project("Y1").unwrap();
        assert_eq!((y.classroom_id.as_str(), y.timeslot_id.as_str()), ("C2", "T3"));
        assert!(detect_conflicts(&c.schedule).is_empty());
    }

    #[test]
    fn test_responsible_always_first() {
        let p = two_instructor_problem();
        let mut rng = StdRng::seed_from_u64(42);
        for randomness in [0.0, 0.5, 1.0] {
            let c = FairnessBuilder::new(&p).build_randomized(randomness, &mut rng);
            for a in c.schedule.assignments() {
                let project = p.project(&a.project_id).unwrap();
                assert_eq!(a.responsible(), Some(project.responsible_instructor_id.as_str()));
            }
        }
    }

    #[test]
    fn test_exhausted_capacity_leaves_projects_unassigned() {
        let p = Problem::new(ProblemData::new(
            vec![
                Project::interim("A1", "A"),
                Project::interim("A2", "A"),
                Project::interim("A3", "A"),
            ],
            vec![Instructor::faculty("A")],
            rooms(1),
            timeslots(2),
        ))
        .unwrap();

        let c = FairnessBuilder::new(&p).build();
        assert_eq!(c.schedule.len(), 2);
        assert_eq!(c.unassigned, vec!["A3".to_string()]);
    }

    #[test]
    fn test_loner_gets_faculty_substitute() {
        let p = Problem::new(ProblemData::new(
            vec![
                Project::final_presentation("H1", "H"),
                Project::final_presentation("H2", "H"),
                Project::final_presentation("L1", "L"),
                Project::final_presentation("S1", "S"),
            ],
            vec![
                Instructor::faculty("H"),
                Instructor::faculty("L"),
                Instructor::assistant("S"),
            ],
            rooms(2),
            timeslots(4),
        ))
        .unwrap();

        let c = FairnessBuilder::new(&p).build();
        assert!(c.unassigned.is_empty());
        // Ranking H(2), L(1), S(1): pair (H, L), S alone.
        let s1 = c.schedule.assignment_for_project("S1").unwrap();
        assert_eq!(s1.responsible(), Some("S"));
        assert_eq!(s1.jury().len(), 1);
        assert!(p.is_faculty(&s1.jury()[0]));
        assert!(detect_conflicts(&c.schedule).is_empty());
    }

    #[test]
    fn test_makeup_projects_placed_last() {
        let p = Problem::new(ProblemData::new(
            vec![
                Project::interim("M1", "A").as_makeup(),
                Project::interim("R1", "A"),
            ],
            vec![Instructor::faculty("A"), Instructor::faculty("B")],
            rooms(1),
            timeslots(2),
        ))
        .unwrap();

        let c = FairnessBuilder::new(&p).build();
        assert_eq!(c.schedule.assignment_for_project("R1").unwrap().timeslot_id, "T1");
        assert_eq!(c.schedule.assignment_for_project("M1").unwrap().timeslot_id, "T2");
    }

    #[test]
    fn test_shared_fallback_never_reuses_a_slot() {
        // Two finals, one jury candidate, one timeslot: jury double booking is accepted.
        let p = Problem::new(ProblemData::new(
            vec![
                Project::final_presentation("A1", "A"),
                Project::final_presentation("B1", "B"),
            ],
            vec![Instructor::faculty("A"), Instructor::faculty("B")],
            rooms(2),
            timeslots(1),
        ))
        .unwrap();

        let c = FairnessBuilder::new(&p).build();
        assert!(c.unassigned.is_empty());
        assert!(c.fallback_penalty >= SlotTier::Shared.penalty());
        let conflicts = detect_conflicts(&c.schedule);
        assert!(conflicts
            .iter()
            .all(|k| k.kind != crate::models::ConflictKind::ClassroomDoubleBooking));
    }

    #[test]
    fn test_deterministic_without_randomness() {
        let p = two_instructor_problem();
        let a = FairnessBuilder::new(&p).build();
        let mut rng = StdRng::seed_from_u64(9);
        let b = FairnessBuilder::new(&p).build_randomized(0.0, &mut rng);
        assert_eq!(a.schedule, b.schedule);
    }

    #[test]
    fn test_randomized_is_seed_reproducible() {
        let p = two_instructor_problem();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            FairnessBuilder::new(&p).build_randomized(1.0, &mut rng).schedule
        };
        assert_eq!(run(3), run(3));
    }
}
