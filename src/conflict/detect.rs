//! Conflict detection.
//!
//! Scans the schedule's slot and instructor indices, so detection is
//! linear in the number of assignments. Output order is deterministic:
//! by kind, then timeslot, then resource.

use std::collections::{HashMap, HashSet};

use crate::models::{Conflict, Schedule};

/// Detects every occupancy conflict in a schedule.
///
/// Timeslot capacity is the number of distinct classrooms the schedule
/// uses; a timeslot holding more assignments than that overflows. The
/// schedule carries no catalog, so an overflow always accompanies a
/// classroom double booking at that timeslot and is charged on top of it.
pub fn detect_conflicts(schedule: &Schedule) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let project_ids = |indices: &[usize]| -> Vec<String> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted
            .into_iter()
            .map(|i| schedule.assignments()[i].project_id.clone())
            .collect()
    };

    let mut classrooms = HashSet::new();
    let mut per_timeslot: HashMap<&str, Vec<usize>> = HashMap::new();
    for (classroom, timeslot, indices) in schedule.occupied_slots() {
        classrooms.insert(classroom);
        per_timeslot
            .entry(timeslot)
            .or_default()
            .extend_from_slice(indices);
        if indices.len() > 1 {
            conflicts.push(Conflict::classroom_double_booking(
                classroom,
                timeslot,
                project_ids(indices),
            ));
        }
    }

    for (instructor, timeslot, indices) in schedule.busy_instructors() {
        if indices.len() > 1 {
            let responsible = indices
                .iter()
                .any(|&i| schedule.assignments()[i].responsible() == Some(instructor));
            conflicts.push(Conflict::instructor_double_booking(
                instructor,
                timeslot,
                project_ids(indices),
                responsible,
            ));
        }
    }

    let capacity = classrooms.len();
    for (timeslot, indices) in &per_timeslot {
        if indices.len() > capacity {
            conflicts.push(Conflict::timeslot_overflow(*timeslot, project_ids(indices)));
        }
    }

    conflicts.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.timeslot_id.cmp(&b.timeslot_id))
            .then_with(|| a.resource_id.cmp(&b.resource_id))
    });
    conflicts
}
