//! Fitness (energy) evaluation.
//!
//! # Terms
//!
//! | Term | Effect |
//! |------|--------|
//! | Rule deficit | `rule × violating / assignments` |
//! | Classroom changes | `classroom_change × changes` |
//! | Load balance | `−(1 − gini) × load_balance` |
//! | Time slot | escalating cost at/after the cutoff, fading band before it |
//! | Gaps | `gap × Σ run²` |
//! | Conflicts | `conflict × Σ severity/100 × excess` |
//! | Uniformity | `−uniformity × max(0, 1 − cv)` over classroom counts |
//! | Unassigned | `unassigned × missing projects` |
//!
//! Conflicts are the dominant term by default, which is how occupancy
//! violations steer the search without ever aborting it.

mod energy;
mod metrics;

pub use energy::{evaluate, Energy, EnergyWeights};
pub use metrics::{gini, violates_rules, CompositionRules, ScheduleMetrics};
