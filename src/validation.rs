//! Input validation for jury scheduling problems.
//!
//! Checks structural integrity of the four catalogs before a
//! [`Problem`](crate::models::Problem) is built. Detects:
//! - Duplicate IDs within a catalog
//! - Projects whose responsible instructor is not in the catalog
//! - Timeslots whose wall-clock start cannot be parsed
//!
//! Records are rejected here, once, so the search never meets them.

use std::collections::HashSet;

use crate::models::ProblemData;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same catalog share an ID.
    DuplicateId,
    /// A project references an instructor that doesn't exist.
    UnknownInstructor,
    /// A timeslot start is not a valid `HH:MM` wall-clock time.
    InvalidTimeslot,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the raw catalogs of a scheduling problem.
///
/// Empty catalogs are not reported here; they are
/// [`InsufficientData`](crate::SchedulingError::InsufficientData).
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(data: &ProblemData) -> ValidationResult {
    let mut errors = Vec::new();

    check_unique(
        "instructor",
        data.instructors.iter().map(|i| i.id.as_str()),
        &mut errors,
    );
    check_unique(
        "classroom",
        data.classrooms.iter().map(|c| c.id.as_str()),
        &mut errors,
    );
    check_unique(
        "timeslot",
        data.timeslots.iter().map(|t| t.id.as_str()),
        &mut errors,
    );
    check_unique(
        "project",
        data.projects.iter().map(|p| p.id.as_str()),
        &mut errors,
    );

    let instructor_ids: HashSet<&str> = data.instructors.iter().map(|i| i.id.as_str()).collect();
    for project in &data.projects {
        if !instructor_ids.contains(project.responsible_instructor_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownInstructor,
                format!(
                    "Project '{}' references unknown instructor '{}'",
                    project.id, project.responsible_instructor_id
                ),
            ));
        }
    }

    for slot in &data.timeslots {
        if slot.start_minutes().is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeslot,
                format!("Timeslot '{}' has invalid start '{}'", slot.id, slot.start),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_unique<'a>(
    catalog: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {catalog} ID: {id}"),
            ));
        }
    }
}
