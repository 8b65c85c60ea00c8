//! Post-optimization compaction.
//!
//! Two passes tighten the final schedule without creating double bookings:
//!
//! - **Gap filling**: every assignment moves to the earliest earlier slot
//!   in its classroom where all of its instructors are free.
//! - **Balancing**: classrooms whose occupied range is much longer than
//!   average hand their last assignments to other classrooms.
//!
//! Both passes only ever move assignments earlier, and [`Compactor::compact`]
//! alternates them until neither moves anything, so compacting a compacted
//! schedule changes nothing.

mod balance;
mod gap_fill;

pub use balance::balance_classrooms;
pub use gap_fill::fill_gaps;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{Problem, Schedule};

/// Compaction options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompactorConfig {
    /// Run compaction after optimization.
    pub enabled: bool,
    /// Run the gap-filling pass.
    pub gap_fill: bool,
    /// Run the balancing pass.
    pub balance: bool,
    /// Allowed excess over the average classroom span, in timeslots.
    pub balance_tolerance: f64,
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gap_fill: true,
            balance: true,
            balance_tolerance: 1.0,
        }
    }
}

impl CompactorConfig {
    pub fn validate(&self) -> SchedulingResult<()> {
        if !self.balance_tolerance.is_finite() || self.balance_tolerance < 0.0 {
            return Err(SchedulingError::InvalidConfiguration(format!(
                "balance_tolerance must be finite and non-negative, got {}",
                self.balance_tolerance
            )));
        }
        Ok(())
    }
}

/// Moves performed by a compaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionReport {
    pub gap_moves: usize,
    pub balance_moves: usize,
    /// Alternations of the two passes, including the final idle one.
    pub rounds: usize,
}

impl CompactionReport {
    pub fn moves(&self) -> usize {
        self.gap_moves + self.balance_moves
    }
}

/// Runs the compaction passes to a fixed point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compactor {
    config: CompactorConfig,
}

impl Compactor {
    pub fn new(config: CompactorConfig) -> Self {
        Self { config }
    }

    /// Compacts a copy of `schedule`.
    pub fn compact(&self, problem: &Problem, schedule: &Schedule) -> (Schedule, CompactionReport) {
        let mut compacted = schedule.clone();
        let mut report = CompactionReport::default();

        loop {
            report.rounds += 1;
            let gap = if self.config.gap_fill {
                fill_gaps(problem, &mut compacted)
            } else {
                0
            };
            let balanced = if self.config.balance {
                balance_classrooms(problem, &mut compacted, self.config.balance_tolerance)
            } else {
                0
            };
            report.gap_moves += gap;
            report.balance_moves += balanced;
            if gap + balanced == 0 {
                break;
            }
        }

        debug!(
            gap_moves = report.gap_moves,
            balance_moves = report.balance_moves,
            rounds = report.rounds,
            "compaction finished"
        );
        (compacted, report)
    }
}
