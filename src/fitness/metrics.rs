//! Schedule quality metrics.
//!
//! Raw measurements the evaluator turns into energy terms, also useful on
//! their own for reporting.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Instructor load | Assignments an instructor takes part in (responsible or jury) |
//! | Gini | Inequality of instructor loads, 0 = perfectly equal |
//! | Classroom changes | Classroom switches along each instructor's chronological sequence |
//! | Gap runs | Contiguous unused slots before a classroom's last used slot |
//! | Classroom counts | Assignments per classroom |
//! | Rule violations | Assignments breaking composition rules |
//!
//! All per-entity vectors follow catalog order, which keeps every
//! derived float bit-for-bit reproducible.

use std::collections::HashSet;

use crate::models::{Assignment, Problem, Schedule};

/// Composition rules an assignment must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionRules {
    /// Maximum instructors on one assignment (responsible included).
    pub max_instructors: usize,
    /// Minimum jury members on a final presentation.
    pub min_final_jury: usize,
}

impl Default for CompositionRules {
    fn default() -> Self {
        Self {
            max_instructors: 3,
            min_final_jury: 1,
        }
    }
}

/// Measured properties of a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleMetrics {
    /// Load per catalog instructor.
    pub instructor_loads: Vec<usize>,
    /// Gini coefficient of `instructor_loads`.
    pub gini: f64,
    /// Total classroom changes across instructors.
    pub classroom_changes: usize,
    /// Assignments per catalog classroom.
    pub classroom_counts: Vec<usize>,
    /// Gap run lengths, classroom by classroom.
    pub gap_runs: Vec<usize>,
    /// Assignments that break at least one composition rule.
    pub rule_violations: usize,
    /// Catalog projects with no assignment.
    pub unassigned: usize,
}

impl ScheduleMetrics {
    /// Computes metrics for a schedule.
    pub fn calculate(schedule: &Schedule, problem: &Problem, rules: &CompositionRules) -> Self {
        let instructor_loads: Vec<usize> = problem
            .instructors()
            .iter()
            .map(|i| schedule.indices_for_instructor(&i.id).len())
            .collect();
        let gini = gini(&instructor_loads);

        let classroom_changes = problem
            .instructors()
            .iter()
            .map(|i| classroom_changes(schedule, problem, &i.id))
            .sum();

        let classroom_counts: Vec<usize> = problem
            .classrooms()
            .iter()
            .map(|c| schedule.indices_in_classroom(&c.id).len())
            .collect();

        let gap_runs = problem
            .classrooms()
            .iter()
            .flat_map(|c| gap_runs(schedule, problem, &c.id))
            .collect();

        let rule_violations = schedule
            .assignments()
            .iter()
            .filter(|a| violates_rules(a, problem, rules))
            .count();

        let unassigned = problem
            .projects()
            .iter()
            .filter(|p| schedule.index_of_project(&p.id).is_none())
            .count();

        Self {
            instructor_loads,
            gini,
            classroom_changes,
            classroom_counts,
            gap_runs,
            rule_violations,
            unassigned,
        }
    }

    /// Coefficient of variation of classroom counts (0 when all equal or empty).
    pub fn classroom_dispersion(&self) -> f64 {
        let n = self.classroom_counts.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.classroom_counts.iter().sum::<usize>() as f64 / n as f64;
        if mean <= 0.0 {
            return 0.0;
        }
        let variance = self
            .classroom_counts
            .iter()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        variance.sqrt() / mean
    }
}

/// Gini coefficient of non-negative values. 0 for empty or all-zero input.
pub fn gini(values: &[usize]) -> f64 {
    let n = values.len();
    let total: usize = values.iter().sum();
    if n == 0 || total == 0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| (i + 1) as f64 * x as f64)
        .sum();
    let n = n as f64;
    (2.0 * weighted) / (n * total as f64) - (n + 1.0) / n
}

/// Whether an assignment breaks a composition rule.
///
/// Rules: responsible instructor first, no repeated instructor, at most
/// `max_instructors`, finals carry `min_final_jury` jury members and at
/// least one faculty member.
pub fn violates_rules(
    assignment: &Assignment,
    problem: &Problem,
    rules: &CompositionRules,
) -> bool {
    let Some(project) = problem.project(&assignment.project_id) else {
        return true;
    };
    if assignment.responsible() != Some(project.responsible_instructor_id.as_str()) {
        return true;
    }
    if assignment.instructor_ids.len() > rules.max_instructors {
        return true;
    }
    let distinct: HashSet<&str> = assignment.instructor_ids.iter().map(String::as_str).collect();
    if distinct.len() != assignment.instructor_ids.len() {
        return true;
    }
    if project.requires_jury() {
        if assignment.jury().len() < rules.min_final_jury {
            return true;
        }
        if !assignment.instructor_ids.iter().any(|i| problem.is_faculty(i)) {
            return true;
        }
    }
    false
}

fn classroom_changes(schedule: &Schedule, problem: &Problem, instructor_id: &str) -> usize {
    let mut visits: Vec<(usize, &str)> = schedule
        .indices_for_instructor(instructor_id)
        .into_iter()
        .filter_map(|idx| {
            let a = &schedule.assignments()[idx];
            problem
                .timeslot_order(&a.timeslot_id)
                .map(|order| (order, a.classroom_id.as_str()))
        })
        .collect();
    visits.sort_unstable();
    visits.windows(2).filter(|w| w[0].1 != w[1].1).count()
}

fn gap_runs(schedule: &Schedule, problem: &Problem, classroom_id: &str) -> Vec<usize> {
    let mut used = vec![false; problem.timeslots().len()];
    for idx in schedule.indices_in_classroom(classroom_id) {
        if let Some(order) = problem.timeslot_order(&schedule.assignments()[idx].timeslot_id) {
            used[order] = true;
        }
    }
    let Some(last) = used.iter().rposition(|&u| u) else {
        return Vec::new();
    };

    let mut runs = Vec::new();
    let mut current = 0;
    for &slot_used in &used[..last] {
        if slot_used {
            if current > 0 {
                runs.push(current);
            }
            current = 0;
        } else {
            current += 1;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}
