//! Cross-classroom balancing.
//!
//! A classroom's span is the number of timeslots between its first and
//! last used slot, inclusive (0 when unused). Classrooms whose span
//! exceeds the average by more than the tolerance hand their last
//! assignment to another classroom, at a strictly earlier timeslot as
//! close as possible to the end of the average span.

use crate::models::{Problem, Schedule};

/// Occupied range `(first, last)` of each catalog classroom.
fn ranges(problem: &Problem, schedule: &Schedule) -> Vec<Option<(usize, usize)>> {
    problem
        .classrooms()
        .iter()
        .map(|c| {
            let orders = schedule
                .indices_in_classroom(&c.id)
                .into_iter()
                .filter_map(|idx| problem.timeslot_order(&schedule.get(idx)?.timeslot_id));
            orders.fold(None, |range, order| match range {
                None => Some((order, order)),
                Some((lo, hi)) => Some((lo.min(order), hi.max(order))),
            })
        })
        .collect()
}

fn span(range: Option<(usize, usize)>) -> usize {
    range.map_or(0, |(lo, hi)| hi - lo + 1)
}

/// Rebalances classroom spans. Returns the number of moves.
///
/// Every move lands strictly earlier than where it started, so the pass
/// terminates, and a second call on its output is a no-op.
pub fn balance_classrooms(problem: &Problem, schedule: &mut Schedule, tolerance: f64) -> usize {
    let rooms = problem.classrooms().len();
    if rooms < 2 {
        return 0;
    }

    let mut moves = 0;
    loop {
        let current = ranges(problem, schedule);
        let average = current.iter().map(|&r| span(r)).sum::<usize>() as f64 / rooms as f64;
        let limit = average + tolerance;

        let moved = (0..rooms)
            .filter(|&room| span(current[room]) as f64 > limit)
            .any(|room| relocate_tail(problem, schedule, &current, room, average, limit));
        if !moved {
            return moves;
        }
        moves += 1;
    }
}

/// Moves one assignment from the last used slot of `room` elsewhere.
fn relocate_tail(
    problem: &Problem,
    schedule: &mut Schedule,
    ranges: &[Option<(usize, usize)>],
    room: usize,
    average: f64,
    limit: f64,
) -> bool {
    let Some((_, last)) = ranges[room] else {
        return false;
    };
    let source = &problem.classrooms()[room].id;
    let last_id = &problem.timeslots()[last].id;
    let tail: Vec<usize> = schedule.at_slot(source, last_id).to_vec();
    let target = (average.ceil() as usize).saturating_sub(1);

    for idx in tail {
        let Some(assignment) = schedule.get(idx) else {
            continue;
        };
        let found = outward(target, last).find_map(|order| {
            let timeslot = &problem.timeslots()[order].id;
            problem
                .classrooms()
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != room)
                .find(|&(other, classroom)| {
                    let widened = match ranges[other] {
                        None => (order, order),
                        Some((lo, hi)) => (lo.min(order), hi.max(order)),
                    };
                    span(Some(widened)) as f64 <= limit
                        && schedule.can_host(
                            &classroom.id,
                            timeslot,
                            &assignment.instructor_ids,
                            Some(idx),
                        )
                })
                .map(|(_, classroom)| (classroom.id.clone(), timeslot.clone()))
        });
        if let Some((classroom_id, timeslot_id)) = found {
            schedule.move_to(idx, classroom_id, timeslot_id);
            return true;
        }
    }
    false
}

/// Orders below `bound`, nearest to `target` first, earlier before later.
fn outward(target: usize, bound: usize) -> impl Iterator<Item = usize> {
    let target = target.min(bound.saturating_sub(1));
    (0..bound).flat_map(move |distance| {
        let earlier = target.checked_sub(distance);
        let later = (distance > 0).then_some(target + distance);
        [earlier, later]
            .into_iter()
            .flatten()
            .filter(move |&order| order < bound)
    })
}
