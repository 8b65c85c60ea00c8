//! Jury and presentation scheduling engine.
//!
//! Places student project presentations into classroom × timeslot slots
//! and staffs each with its responsible instructor plus jury members,
//! balancing instructor workload while keeping each instructor's
//! presentations grouped in one classroom.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Project`, `Instructor`, `Classroom`,
//!   `Timeslot`, `Problem`, `Assignment`, `Schedule`, `Conflict`
//! - **`validation`**: Input integrity checks (duplicate IDs, orphaned
//!   projects, malformed timeslots)
//! - **`fitness`**: Energy evaluation and schedule metrics
//! - **`conflict`**: Conflict detection and soft repair
//! - **`construction`**: Fairness-paired construction heuristic
//! - **`anneal`**: Temperature-annealed local search
//! - **`compact`**: Post-optimization gap filling and balancing
//! - **`engine`**: `Scheduler` entry points and run results
//!
//! # Soft constraints
//!
//! Double bookings are never rejected inside a run. They are penalized by
//! the evaluator, repaired where possible by the resolver, and reported
//! in [`OptimizationResult::residual_conflicts`]. Only malformed input and
//! configuration produce errors.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod anneal;
pub mod compact;
pub mod conflict;
pub mod construction;
pub mod engine;
pub mod error;
pub mod fitness;
pub mod models;
pub mod validation;

pub use conflict::detect_conflicts;
pub use engine::{OptimizationResult, Scheduler};
pub use error::{SchedulingError, SchedulingResult};
pub use fitness::{evaluate, Energy, EnergyWeights};
