//! Energy evaluation.
//!
//! Energy is a weighted sum of penalty terms minus two rewards. Lower is
//! better. Evaluation is pure: it reads the schedule, the catalog and the
//! weights, and always yields the same bits for the same input.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::{CompositionRules, ScheduleMetrics};
use crate::conflict::detect_conflicts;
use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{parse_wall_clock, Problem, Schedule};

/// Term weights and thresholds of the energy function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnergyWeights {
    /// Scale of the rule-compliance deficit (fraction of violating assignments).
    pub rule: f64,
    /// Cost per classroom change along an instructor's day.
    pub classroom_change: f64,
    /// Scale of the load-balance reward `(1 - gini) * scale`.
    pub load_balance: f64,
    /// Base cost of an assignment at or after the cutoff; grows per slot past it.
    pub late_slot: f64,
    /// Cost of the slot right before the cutoff; fades across the band.
    pub late_band: f64,
    /// Wall-clock cutoff (`"HH:MM"`). `None` disables the time-slot term.
    pub late_cutoff: Option<String>,
    /// Number of slots before the cutoff that form the intermediate band.
    pub late_band_slots: usize,
    /// Cost per squared gap-run length.
    pub gap: f64,
    /// Cost per severity-weighted conflict.
    pub conflict: f64,
    /// Scale of the classroom-uniformity reward.
    pub uniformity: f64,
    /// Cost per project without an assignment.
    pub unassigned: f64,
    /// Maximum instructors on one assignment.
    pub max_instructors: usize,
    /// Minimum jury members on a final presentation.
    pub min_final_jury: usize,
}

impl Default for EnergyWeights {
    fn default() -> Self {
        Self {
            rule: 500.0,
            classroom_change: 10.0,
            load_balance: 100.0,
            late_slot: 50.0,
            late_band: 15.0,
            late_cutoff: Some("16:30".to_string()),
            late_band_slots: 2,
            gap: 5.0,
            conflict: 1000.0,
            uniformity: 50.0,
            unassigned: 2000.0,
            max_instructors: 3,
            min_final_jury: 1,
        }
    }
}

impl EnergyWeights {
    /// Rejects negative or non-finite weights, an unparseable cutoff,
    /// and rules that no final presentation could satisfy.
    pub fn validate(&self) -> SchedulingResult<()> {
        let scalars = [
            ("rule", self.rule),
            ("classroom_change", self.classroom_change),
            ("load_balance", self.load_balance),
            ("late_slot", self.late_slot),
            ("late_band", self.late_band),
            ("gap", self.gap),
            ("conflict", self.conflict),
            ("uniformity", self.uniformity),
            ("unassigned", self.unassigned),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(SchedulingError::InvalidConfiguration(format!(
                    "weight '{name}' must be finite and non-negative, got {value}"
                )));
            }
        }
        if let Some(cutoff) = &self.late_cutoff {
            if parse_wall_clock(cutoff).is_none() {
                return Err(SchedulingError::InvalidConfiguration(format!(
                    "late_cutoff '{cutoff}' is not an HH:MM time"
                )));
            }
        }
        if self.max_instructors == 0 || self.min_final_jury + 1 > self.max_instructors {
            return Err(SchedulingError::InvalidConfiguration(format!(
                "max_instructors {} cannot hold a responsible instructor and {} jury",
                self.max_instructors, self.min_final_jury
            )));
        }
        Ok(())
    }

    /// Composition rules carried by these weights.
    pub fn rules(&self) -> CompositionRules {
        CompositionRules {
            max_instructors: self.max_instructors,
            min_final_jury: self.min_final_jury,
        }
    }
}

/// Evaluated energy with its per-term breakdown.
///
/// `total = rule + classroom_changes + timeslot + gaps + conflicts + unassigned
///          - load_balance - uniformity`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub total: f64,
    pub rule: f64,
    pub classroom_changes: f64,
    pub load_balance: f64,
    pub timeslot: f64,
    pub gaps: f64,
    pub conflicts: f64,
    pub uniformity: f64,
    pub unassigned: f64,
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} (rule {:.1}, changes {:.1}, balance -{:.1}, time {:.1}, gaps {:.1}, conflicts {:.1}, uniform -{:.1}, unassigned {:.1})",
            self.total,
            self.rule,
            self.classroom_changes,
            self.load_balance,
            self.timeslot,
            self.gaps,
            self.conflicts,
            self.uniformity,
            self.unassigned
        )
    }
}

/// Scores a schedule. Lower is better.
pub fn evaluate(schedule: &Schedule, problem: &Problem, weights: &EnergyWeights) -> Energy {
    let metrics = ScheduleMetrics::calculate(schedule, problem, &weights.rules());

    let rule = if schedule.is_empty() {
        0.0
    } else {
        weights.rule * metrics.rule_violations as f64 / schedule.len() as f64
    };
    let classroom_changes = weights.classroom_change * metrics.classroom_changes as f64;
    let load_balance = (1.0 - metrics.gini) * weights.load_balance;
    let timeslot = timeslot_penalty(schedule, problem, weights);
    let gaps = weights.gap
        * metrics
            .gap_runs
            .iter()
            .map(|&run| (run * run) as f64)
            .sum::<f64>();
    let conflicts = weights.conflict
        * detect_conflicts(schedule)
            .iter()
            .map(|c| c.weight())
            .sum::<f64>();
    let uniformity = if schedule.is_empty() {
        0.0
    } else {
        weights.uniformity * (1.0 - metrics.classroom_dispersion()).max(0.0)
    };
    let unassigned = weights.unassigned * metrics.unassigned as f64;

    let total = rule + classroom_changes + timeslot + gaps + conflicts + unassigned
        - load_balance
        - uniformity;

    Energy {
        total,
        rule,
        classroom_changes,
        load_balance,
        timeslot,
        gaps,
        conflicts,
        uniformity,
        unassigned,
    }
}

fn timeslot_penalty(schedule: &Schedule, problem: &Problem, weights: &EnergyWeights) -> f64 {
    let Some(minutes) = weights.late_cutoff.as_deref().and_then(parse_wall_clock) else {
        return 0.0;
    };
    // A cutoff past the last slot still charges the trailing band.
    let cutoff = problem
        .first_order_at_or_after(minutes)
        .unwrap_or(problem.timeslots().len());
    let band = weights.late_band_slots;

    schedule
        .assignments()
        .iter()
        .filter_map(|a| problem.timeslot_order(&a.timeslot_id))
        .map(|order| {
            if order >= cutoff {
                weights.late_slot * (1 + order - cutoff) as f64
            } else if band > 0 && cutoff - order <= band {
                let distance = cutoff - order;
                weights.late_band * (band + 1 - distance) as f64 / band as f64
            } else {
                0.0
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Classroom, Instructor, Project, ProblemData, Timeslot};

    fn problem() -> Problem {
        let timeslots = ["13:30", "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00"]
            .iter()
            .enumerate()
            .map(|(k, start)| Timeslot::new(format!("T{}", k + 1), *start))
            .collect();
        Problem::new(ProblemData::new(
            vec![
                Project::final_presentation("P1", "I1"),
                Project::final_presentation("P2", "I1"),
                Project::interim("P3", "I2"),
            ],
            vec![Instructor::faculty("I1"), Instructor::faculty("I2")],
            vec![Classroom::new("C1"), Classroom::new("C2")],
            timeslots,
        ))
        .unwrap()
    }

    fn clean() -> Schedule {
        let mut s = Schedule::new();
        s.push(Assignment::new("P1", "C1", "T1", "I1").with_jury("I2"));
        s.push(Assignment::new("P2", "C1", "T2", "I1").with_jury("I2"));
        s.push(Assignment::new("P3", "C2", "T3", "I2"));
        s
    }

    #[test]
    fn test_clean_fixture_has_no_conflicts() {
        assert!(crate::conflict::detect_conflicts(&clean()).is_empty());
    }

    fn single_slot_penalty(starts: &[&str], timeslot_id: &str) -> f64 {
        let timeslots = starts
            .iter()
            .enumerate()
            .map(|(k, start)| Timeslot::new(format!("T{}", k + 1), *start))
            .collect();
        let p = Problem::new(ProblemData::new(
            vec![Project::interim("P1", "I1")],
            vec![Instructor::faculty("I1")],
            vec![Classroom::new("C1")],
            timeslots,
        ))
        .unwrap();
        let mut s = Schedule::new();
        s.push(Assignment::new("P1", "C1", timeslot_id, "I1"));
        evaluate(&s, &p, &EnergyWeights::default()).timeslot
    }

    #[test]
    fn test_late_band_applies_when_day_ends_before_cutoff() {
        let w = EnergyWeights::default();
        let with_cutoff_slot = ["15:00", "15:30", "16:00", "16:30"];
        let ends_early = ["15:00", "15:30", "16:00"];

        assert_eq!(single_slot_penalty(&with_cutoff_slot, "T3"), w.late_band);
        assert_eq!(single_slot_penalty(&ends_early, "T3"), w.late_band);
        assert_eq!(single_slot_penalty(&with_cutoff_slot, "T2"), w.late_band / 2.0);
        assert_eq!(single_slot_penalty(&ends_early, "T2"), w.late_band / 2.0);
        assert_eq!(single_slot_penalty(&ends_early, "T1"), 0.0);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let p = problem();
        let s = clean();
        let w = EnergyWeights::default();
        let a = evaluate(&s, &p, &w);
        let b = evaluate(&s, &p, &w);
        assert_eq!(a.total.to_bits(), b.total.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_total_matches_breakdown() {
        let p = problem();
        let e = evaluate(&clean(), &p, &EnergyWeights::default());
        let sum = e.rule + e.classroom_changes + e.timeslot + e.gaps + e.conflicts + e.unassigned
            - e.load_balance
            - e.uniformity;
        assert!((e.total - sum).abs() < 1e-9);
        assert_eq!(e.conflicts, 0.0);
        assert_eq!(e.rule, 0.0);
        assert_eq!(e.unassigned, 0.0);
    }

    #[test]
    fn test_double_booking_raises_energy() {
        let p = problem();
        let w = EnergyWeights::default();
        let mut dirty = Schedule::new();
        dirty.push(Assignment::new("P1", "C1", "T1", "I1").with_jury("I2"));
        dirty.push(Assignment::new("P2", "C1", "T2", "I1").with_jury("I2"));
        // I2 responsible at T2 while sitting on P2's jury.
        dirty.push(Assignment::new("P3", "C2", "T2", "I2"));

        let mut clean = Schedule::new();
        clean.push(Assignment::new("P1", "C1", "T1", "I1").with_jury("I2"));
        clean.push(Assignment::new("P2", "C1", "T2", "I1").with_jury("I2"));
        clean.push(Assignment::new("P3", "C2", "T3", "I2"));

        assert!(evaluate(&dirty, &p, &w).total > evaluate(&clean, &p, &w).total);
    }

    #[test]
    fn test_gap_penalty_is_superlinear() {
        let p = problem();
        let w = EnergyWeights {
            late_cutoff: None,
            ..EnergyWeights::default()
        };
        // One gap of two slots vs two gaps of one slot.
        let mut wide = Schedule::new();
        wide.push(Assignment::new("P1", "C1", "T1", "I1").with_jury("I2"));
        wide.push(Assignment::new("P2", "C1", "T4", "I1").with_jury("I2"));

        let mut split = Schedule::new();
        split.push(Assignment::new("P1", "C1", "T2", "I1").with_jury("I2"));
        split.push(Assignment::new("P2", "C1", "T4", "I1").with_jury("I2"));

        let wide_e = evaluate(&wide, &p, &w);
        let split_e = evaluate(&split, &p, &w);
        assert_eq!(wide_e.gaps, 4.0 * w.gap);
        assert_eq!(split_e.gaps, 2.0 * w.gap);
    }

    #[test]
    fn test_timeslot_penalty_escalates() {
        let p = problem();
        let w = EnergyWeights::default();
        let at = |slot: &str| {
            let mut s = Schedule::new();
            s.push(Assignment::new("P3", "C1", slot, "I2"));
            evaluate(&s, &p, &w).timeslot
        };
        // Cutoff 16:30 is T7; band covers T5 and T6.
        assert_eq!(at("T4"), 0.0);
        assert!(at("T5") > 0.0);
        assert!(at("T6") > at("T5"));
        assert!(at("T7") > at("T6"));
        assert!(at("T8") > at("T7"));
        assert_eq!(at("T7"), w.late_slot);
        assert_eq!(at("T6"), w.late_band);
    }

    #[test]
    fn test_unassigned_and_rule_terms() {
        let p = problem();
        let w = EnergyWeights::default();
        let mut s = Schedule::new();
        // Final without jury: one of two assignments violates.
        s.push(Assignment::new("P1", "C1", "T1", "I1"));
        s.push(Assignment::new("P3", "C2", "T1", "I2"));

        let e = evaluate(&s, &p, &w);
        assert!((e.rule - w.rule * 0.5).abs() < 1e-12);
        assert_eq!(e.unassigned, w.unassigned);
    }

    #[test]
    fn test_balanced_load_lowers_energy() {
        let p = problem();
        let w = EnergyWeights {
            late_cutoff: None,
            ..EnergyWeights::default()
        };
        let mut lopsided = Schedule::new();
        lopsided.push(Assignment::new("P1", "C1", "T1", "I1").with_jury("I2"));
        lopsided.push(Assignment::new("P2", "C1", "T2", "I1").with_jury("I2"));
        lopsided.push(Assignment::new("P3", "C1", "T3", "I2"));
        let e = evaluate(&lopsided, &p, &w);
        // Loads 2 and 3: gini 0.1.
        assert!((e.load_balance - 0.9 * w.load_balance).abs() < 1e-9);
    }

    #[test]
    fn test_weights_validation() {
        assert!(EnergyWeights::default().validate().is_ok());

        let negative = EnergyWeights {
            gap: -1.0,
            ..EnergyWeights::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(SchedulingError::InvalidConfiguration(_))
        ));

        let bad_cutoff = EnergyWeights {
            late_cutoff: Some("late".into()),
            ..EnergyWeights::default()
        };
        assert!(bad_cutoff.validate().is_err());

        let cramped = EnergyWeights {
            max_instructors: 1,
            ..EnergyWeights::default()
        };
        assert!(cramped.validate().is_err());
    }

    #[test]
    fn test_weights_reject_unknown_fields() {
        let parsed: Result<EnergyWeights, _> = serde_json::from_str(r#"{"gap": 2.0, "bogus": 1}"#);
        assert!(parsed.is_err());

        let partial: EnergyWeights = serde_json::from_str(r#"{"gap": 2.0}"#).unwrap();
        assert_eq!(partial.gap, 2.0);
        assert_eq!(partial.conflict, EnergyWeights::default().conflict);
    }
}
