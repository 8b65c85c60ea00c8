//! Problem catalog.
//!
//! [`ProblemData`] is the raw input as loaded by the caller. [`Problem`]
//! is the validated, immutable catalog the engine works against: timeslots
//! sorted chronologically with their `order` derived, plus O(1) id lookups.
//! A `Problem` is read-only for its whole lifetime and can be shared by
//! reference across concurrent runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Classroom, Instructor, Project, Timeslot};
use crate::error::{SchedulingError, SchedulingResult};
use crate::validation::validate_input;

/// Raw problem input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemData {
    /// Projects to place.
    pub projects: Vec<Project>,
    /// Available instructors.
    pub instructors: Vec<Instructor>,
    /// Available classrooms.
    pub classrooms: Vec<Classroom>,
    /// Available timeslots (any order).
    pub timeslots: Vec<Timeslot>,
}

/// Validated, indexed problem catalog.
#[derive(Debug, Clone)]
pub struct Problem {
    projects: Vec<Project>,
    instructors: Vec<Instructor>,
    classrooms: Vec<Classroom>,
    timeslots: Vec<Timeslot>,
    start_minutes: Vec<u32>,
    project_index: HashMap<String, usize>,
    instructor_index: HashMap<String, usize>,
    classroom_index: HashMap<String, usize>,
    timeslot_index: HashMap<String, usize>,
}

impl ProblemData {
    /// Creates problem data from the four catalogs.
    pub fn new(
        projects: Vec<Project>,
        instructors: Vec<Instructor>,
        classrooms: Vec<Classroom>,
        timeslots: Vec<Timeslot>,
    ) -> Self {
        Self {
            projects,
            instructors,
            classrooms,
            timeslots,
        }
    }
}

impl Problem {
    /// Validates `data` and builds the catalog.
    ///
    /// # Errors
    /// - [`SchedulingError::InsufficientData`] if any catalog is empty.
    /// - [`SchedulingError::InvalidData`] if validation finds bad records.
    pub fn new(data: ProblemData) -> SchedulingResult<Self> {
        let empty = [
            ("project", data.projects.is_empty()),
            ("instructor", data.instructors.is_empty()),
            ("classroom", data.classrooms.is_empty()),
            ("timeslot", data.timeslots.is_empty()),
        ];
        if let Some(&(catalog, _)) = empty.iter().find(|(_, is_empty)| *is_empty) {
            return Err(SchedulingError::InsufficientData { catalog });
        }

        validate_input(&data).map_err(SchedulingError::InvalidData)?;

        let ProblemData {
            projects,
            instructors,
            classrooms,
            timeslots,
        } = data;

        // Validation guarantees every start parses.
        let mut timed: Vec<(u32, Timeslot)> = timeslots
            .into_iter()
            .map(|t| (t.start_minutes().unwrap_or(u32::MAX), t))
            .collect();
        timed.sort_by(|(a, ta), (b, tb)| a.cmp(b).then_with(|| ta.id.cmp(&tb.id)));

        let mut start_minutes = Vec::with_capacity(timed.len());
        let mut timeslots = Vec::with_capacity(timed.len());
        for (order, (minutes, mut slot)) in timed.into_iter().enumerate() {
            slot.order = order;
            start_minutes.push(minutes);
            timeslots.push(slot);
        }

        Ok(Self {
            project_index: index_by(&projects, |p| &p.id),
            instructor_index: index_by(&instructors, |i| &i.id),
            classroom_index: index_by(&classrooms, |c| &c.id),
            timeslot_index: index_by(&timeslots, |t| &t.id),
            projects,
            instructors,
            classrooms,
            timeslots,
            start_minutes,
        })
    }

    /// All projects, in input order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// All instructors, in input order.
    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    /// All classrooms, in input order.
    pub fn classrooms(&self) -> &[Classroom] {
        &self.classrooms
    }

    /// All timeslots, in chronological order (`timeslots()[k].order == k`).
    pub fn timeslots(&self) -> &[Timeslot] {
        &self.timeslots
    }

    /// Looks up a project.
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.project_index.get(id).map(|&i| &self.projects[i])
    }

    /// Looks up an instructor.
    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructor_index.get(id).map(|&i| &self.instructors[i])
    }

    /// Position of an instructor in the catalog.
    pub fn instructor_position(&self, id: &str) -> Option<usize> {
        self.instructor_index.get(id).copied()
    }

    /// Position of a classroom in the catalog.
    pub fn classroom_position(&self, id: &str) -> Option<usize> {
        self.classroom_index.get(id).copied()
    }

    /// Chronological order of a timeslot.
    pub fn timeslot_order(&self, id: &str) -> Option<usize> {
        self.timeslot_index.get(id).copied()
    }

    /// Timeslot at a chronological order.
    pub fn timeslot_at(&self, order: usize) -> Option<&Timeslot> {
        self.timeslots.get(order)
    }

    /// Whether an instructor is a faculty member (unknown ids are not).
    pub fn is_faculty(&self, instructor_id: &str) -> bool {
        self.instructor(instructor_id)
            .is_some_and(|i| i.is_faculty())
    }

    /// First timeslot order starting at or after `minutes` past midnight.
    ///
    /// Returns `None` when every timeslot starts earlier.
    pub fn first_order_at_or_after(&self, minutes: u32) -> Option<usize> {
        self.start_minutes.iter().position(|&m| m >= minutes)
    }

    /// Number of (classroom, timeslot) slots.
    pub fn capacity(&self) -> usize {
        self.classrooms.len() * self.timeslots.len()
    }
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item).clone(), i))
        .collect()
}
