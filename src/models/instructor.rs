//! Instructor model.
//!
//! Instructors supervise projects and sit on juries. The category
//! decides who may satisfy the faculty requirement of a final jury.

use serde::{Deserialize, Serialize};

/// An instructor who can be responsible for projects or serve as jury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    /// Unique instructor identifier.
    pub id: String,
    /// Academic category.
    pub category: InstructorCategory,
}

/// Instructor classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructorCategory {
    /// Faculty member (professor, lecturer).
    Faculty,
    /// Research or teaching assistant.
    Assistant,
}

impl Instructor {
    /// Creates a new instructor.
    pub fn new(id: impl Into<String>, category: InstructorCategory) -> Self {
        Self {
            id: id.into(),
            category,
        }
    }

    /// Creates a faculty member.
    pub fn faculty(id: impl Into<String>) -> Self {
        Self::new(id, InstructorCategory::Faculty)
    }

    /// Creates an assistant.
    pub fn assistant(id: impl Into<String>) -> Self {
        Self::new(id, InstructorCategory::Assistant)
    }

    /// Whether the instructor is a faculty member.
    #[inline]
    pub fn is_faculty(&self) -> bool {
        self.category == InstructorCategory::Faculty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructor_categories() {
        let f = Instructor::faculty("I1");
        assert_eq!(f.category, InstructorCategory::Faculty);
        assert!(f.is_faculty());

        let a = Instructor::assistant("A1");
        assert_eq!(a.category, InstructorCategory::Assistant);
        assert!(!a.is_faculty());
    }
}
