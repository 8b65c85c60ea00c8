//! Error types.
//!
//! Only conditions detected before a run starts are errors. Anything that
//! happens inside the optimizer loop (unplaceable projects, unresolved
//! conflicts) is reported in the run result instead.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by catalog construction and run entry points.
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("insufficient data: the {catalog} catalog is empty")]
    InsufficientData { catalog: &'static str },

    #[error("invalid problem data: {}", summarize(.0))]
    InvalidData(Vec<ValidationError>),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("malformed options: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_error_messages() {
        let e = SchedulingError::InsufficientData { catalog: "classroom" };
        assert_eq!(
            e.to_string(),
            "insufficient data: the classroom catalog is empty"
        );

        let e = SchedulingError::InvalidData(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate project ID: P1"),
            ValidationError::new(ValidationErrorKind::UnknownInstructor, "Project 'P2' is orphaned"),
        ]);
        assert_eq!(
            e.to_string(),
            "invalid problem data: Duplicate project ID: P1; Project 'P2' is orphaned"
        );
    }
}
