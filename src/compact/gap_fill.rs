//! Gap filling: shift assignments into earlier free slots of their classroom.

use crate::models::{Problem, Schedule};

/// Moves every assignment to the earliest strictly-earlier timeslot where
/// its classroom and all of its instructors are free.
///
/// Repeats until no assignment moves, so a second call is a no-op.
/// Returns the number of moves.
pub fn fill_gaps(problem: &Problem, schedule: &mut Schedule) -> usize {
    let mut moves = 0;
    loop {
        let round = fill_round(problem, schedule);
        if round == 0 {
            return moves;
        }
        moves += round;
    }
}

fn fill_round(problem: &Problem, schedule: &mut Schedule) -> usize {
    let mut moves = 0;
    for classroom in problem.classrooms() {
        let mut queue: Vec<(usize, usize)> = schedule
            .indices_in_classroom(&classroom.id)
            .into_iter()
            .filter_map(|idx| {
                let a = schedule.get(idx)?;
                problem.timeslot_order(&a.timeslot_id).map(|order| (order, idx))
            })
            .collect();
        queue.sort_unstable();

        for (current, idx) in queue {
            let Some(assignment) = schedule.get(idx) else {
                continue;
            };
            let target = problem.timeslots()[..current].iter().find(|t| {
                schedule.can_host(&classroom.id, &t.id, &assignment.instructor_ids, Some(idx))
            });
            if let Some(timeslot) = target {
                let timeslot_id = timeslot.id.clone();
                schedule.move_to(idx, classroom.id.clone(), timeslot_id);
                moves += 1;
            }
        }
    }
    moves
}
