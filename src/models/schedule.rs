//! Schedule (solution) model.
//!
//! A schedule is an ordered collection of assignments, each placing one
//! project into one (classroom, timeslot) slot with an ordered instructor
//! list. Two indices, by slot and by instructor, are kept in step with
//! every insertion and move so occupancy queries are O(1) on average.
//!
//! Occupancy is never enforced: [`Schedule::push`] accepts double
//! bookings, which the evaluator scores and the resolver tries to repair.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Placement of a project into a classroom and timeslot.
///
/// `instructor_ids[0]` is the responsible instructor; the rest are jury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned project ID.
    pub project_id: String,
    /// Assigned classroom ID.
    pub classroom_id: String,
    /// Assigned timeslot ID.
    pub timeslot_id: String,
    /// Responsible instructor followed by jury members.
    pub instructor_ids: Vec<String>,
}

/// Returned by [`Schedule::add`] when the slot already holds an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slot ({classroom_id}, {timeslot_id}) is already occupied by project '{occupant}'")]
pub struct SlotOccupied {
    pub classroom_id: String,
    pub timeslot_id: String,
    pub occupant: String,
}

type SlotIndex = HashMap<String, HashMap<String, Vec<usize>>>;

/// A schedule with incrementally maintained lookup indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Assignment>", into = "Vec<Assignment>")]
pub struct Schedule {
    assignments: Vec<Assignment>,
    /// classroom → timeslot → assignment indices
    by_slot: SlotIndex,
    /// instructor → timeslot → assignment indices
    by_instructor: SlotIndex,
    /// project → first assignment index
    by_project: HashMap<String, usize>,
}

impl Assignment {
    /// Creates an assignment with the responsible instructor only.
    pub fn new(
        project_id: impl Into<String>,
        classroom_id: impl Into<String>,
        timeslot_id: impl Into<String>,
        responsible_instructor_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            classroom_id: classroom_id.into(),
            timeslot_id: timeslot_id.into(),
            instructor_ids: vec![responsible_instructor_id.into()],
        }
    }

    /// Appends a jury member.
    pub fn with_jury(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_ids.push(instructor_id.into());
        self
    }

    /// The responsible instructor (first in the list).
    pub fn responsible(&self) -> Option<&str> {
        self.instructor_ids.first().map(String::as_str)
    }

    /// Jury members (everyone after the responsible instructor).
    pub fn jury(&self) -> &[String] {
        self.instructor_ids.get(1..).unwrap_or(&[])
    }

    /// Whether the instructor takes part in this assignment.
    pub fn involves(&self, instructor_id: &str) -> bool {
        self.instructor_ids.iter().any(|i| i == instructor_id)
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment if its slot is free.
    ///
    /// The check is advisory: callers that treat occupancy as a scored
    /// outcome may ignore the error and [`push`](Self::push) anyway.
    pub fn add(&mut self, assignment: Assignment) -> Result<(), SlotOccupied> {
        if let Some(&occupant) = self
            .at_slot(&assignment.classroom_id, &assignment.timeslot_id)
            .first()
        {
            return Err(SlotOccupied {
                classroom_id: assignment.classroom_id,
                timeslot_id: assignment.timeslot_id,
                occupant: self.assignments[occupant].project_id.clone(),
            });
        }
        self.push(assignment);
        Ok(())
    }

    /// Adds an assignment unconditionally. Returns its index.
    pub fn push(&mut self, assignment: Assignment) -> usize {
        let idx = self.assignments.len();
        self.by_project
            .entry(assignment.project_id.clone())
            .or_insert(idx);
        self.assignments.push(assignment);
        self.index(idx);
        idx
    }

    /// Independent copy for candidate generation.
    pub fn clone_for_candidate(&self) -> Self {
        self.clone()
    }

    /// All assignments, in insertion order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Assignment at an index.
    pub fn get(&self, idx: usize) -> Option<&Assignment> {
        self.assignments.get(idx)
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the schedule has no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Index of the assignment holding a project.
    pub fn index_of_project(&self, project_id: &str) -> Option<usize> {
        self.by_project.get(project_id).copied()
    }

    /// Assignment holding a project.
    pub fn assignment_for_project(&self, project_id: &str) -> Option<&Assignment> {
        self.index_of_project(project_id)
            .map(|idx| &self.assignments[idx])
    }

    /// Indices of assignments in a (classroom, timeslot) slot.
    pub fn at_slot(&self, classroom_id: &str, timeslot_id: &str) -> &[usize] {
        lookup(&self.by_slot, classroom_id, timeslot_id)
    }

    /// Whether a (classroom, timeslot) slot holds no assignment.
    pub fn is_slot_free(&self, classroom_id: &str, timeslot_id: &str) -> bool {
        self.at_slot(classroom_id, timeslot_id).is_empty()
    }

    /// Indices of assignments an instructor takes part in at a timeslot.
    pub fn instructor_at(&self, instructor_id: &str, timeslot_id: &str) -> &[usize] {
        lookup(&self.by_instructor, instructor_id, timeslot_id)
    }

    /// Whether an instructor is unused at a timeslot.
    pub fn is_instructor_free(&self, instructor_id: &str, timeslot_id: &str) -> bool {
        self.instructor_at(instructor_id, timeslot_id).is_empty()
    }

    /// Whether a slot could host `instructor_ids` without any double booking.
    ///
    /// Entries belonging to assignment `ignore` are disregarded, so an
    /// assignment can be tested against a slot it already occupies.
    pub fn can_host(
        &self,
        classroom_id: &str,
        timeslot_id: &str,
        instructor_ids: &[String],
        ignore: Option<usize>,
    ) -> bool {
        let others = |indices: &[usize]| indices.iter().any(|&i| Some(i) != ignore);
        !others(self.at_slot(classroom_id, timeslot_id))
            && instructor_ids
                .iter()
                .all(|inst| !others(self.instructor_at(inst, timeslot_id)))
    }

    /// Indices of every assignment in a classroom.
    pub fn indices_in_classroom(&self, classroom_id: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .by_slot
            .get(classroom_id)
            .map(|slots| slots.values().flatten().copied().collect())
            .unwrap_or_default();
        indices.sort_unstable();
        indices
    }

    /// Indices of every assignment an instructor takes part in.
    pub fn indices_for_instructor(&self, instructor_id: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .by_instructor
            .get(instructor_id)
            .map(|slots| slots.values().flatten().copied().collect())
            .unwrap_or_default();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Occupied slots: `(classroom_id, timeslot_id, indices)`.
    ///
    /// Iteration order is unspecified.
    pub fn occupied_slots(&self) -> impl Iterator<Item = (&str, &str, &[usize])> {
        flatten(&self.by_slot)
    }

    /// Busy instructor-timeslots: `(instructor_id, timeslot_id, indices)`.
    ///
    /// Iteration order is unspecified.
    pub fn busy_instructors(&self) -> impl Iterator<Item = (&str, &str, &[usize])> {
        flatten(&self.by_instructor)
    }

    /// Moves an assignment to another slot, keeping the indices in step.
    ///
    /// Returns `false` if `idx` is out of range.
    pub fn move_to(
        &mut self,
        idx: usize,
        classroom_id: impl Into<String>,
        timeslot_id: impl Into<String>,
    ) -> bool {
        if idx >= self.assignments.len() {
            return false;
        }
        self.unindex(idx);
        let assignment = &mut self.assignments[idx];
        assignment.classroom_id = classroom_id.into();
        assignment.timeslot_id = timeslot_id.into();
        self.index(idx);
        true
    }

    /// Removes a jury member from an assignment.
    ///
    /// The responsible instructor (position 0) is never removed.
    /// Returns `true` if a jury member was removed.
    pub fn remove_jury_member(&mut self, idx: usize, instructor_id: &str) -> bool {
        let Some(position) = self.assignments.get(idx).and_then(|a| {
            a.instructor_ids
                .iter()
                .skip(1)
                .position(|i| i == instructor_id)
                .map(|p| p + 1)
        }) else {
            return false;
        };
        self.unindex(idx);
        self.assignments[idx].instructor_ids.remove(position);
        self.index(idx);
        true
    }

    fn index(&mut self, idx: usize) {
        let a = &self.assignments[idx];
        insert_entry(&mut self.by_slot, &a.classroom_id, &a.timeslot_id, idx);
        for instructor in &a.instructor_ids {
            insert_entry(&mut self.by_instructor, instructor, &a.timeslot_id, idx);
        }
    }

    fn unindex(&mut self, idx: usize) {
        let a = &self.assignments[idx];
        remove_entry(&mut self.by_slot, &a.classroom_id, &a.timeslot_id, idx);
        for instructor in &a.instructor_ids {
            remove_entry(&mut self.by_instructor, instructor, &a.timeslot_id, idx);
        }
    }
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.assignments == other.assignments
    }
}

impl Eq for Schedule {}

impl From<Vec<Assignment>> for Schedule {
    fn from(assignments: Vec<Assignment>) -> Self {
        let mut schedule = Schedule::new();
        for a in assignments {
            schedule.push(a);
        }
        schedule
    }
}

impl From<Schedule> for Vec<Assignment> {
    fn from(schedule: Schedule) -> Self {
        schedule.assignments
    }
}

fn lookup<'a>(index: &'a SlotIndex, outer: &str, timeslot_id: &str) -> &'a [usize] {
    index
        .get(outer)
        .and_then(|slots| slots.get(timeslot_id))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn flatten(index: &SlotIndex) -> impl Iterator<Item = (&str, &str, &[usize])> {
    index.iter().flat_map(|(outer, slots)| {
        slots
            .iter()
            .map(move |(timeslot, indices)| (outer.as_str(), timeslot.as_str(), indices.as_slice()))
    })
}

fn insert_entry(index: &mut SlotIndex, outer: &str, timeslot_id: &str, idx: usize) {
    let entry = index
        .entry(outer.to_string())
        .or_default()
        .entry(timeslot_id.to_string())
        .or_default();
    if !entry.contains(&idx) {
        entry.push(idx);
    }
}

fn remove_entry(index: &mut SlotIndex, outer: &str, timeslot_id: &str, idx: usize) {
    let Some(slots) = index.get_mut(outer) else {
        return;
    };
    if let Some(entry) = slots.get_mut(timeslot_id) {
        entry.retain(|&i| i != idx);
        if entry.is_empty() {
            slots.remove(timeslot_id);
        }
    }
    if slots.is_empty() {
        index.remove(outer);
    }
}
