//! Run entry points.
//!
//! [`Scheduler`] owns a validated catalog and runs any number of
//! independent optimizations over it. Each run owns its schedule and its
//! random stream; the catalog is only ever read.
//!
//! # Pipeline
//!
//! 1. Validate the configuration.
//! 2. Build the deterministic fairness construction.
//! 3. Anneal (skipped when `max_iterations == 0`).
//! 4. Compact, keeping the result only if its energy is not worse.
//! 5. Report unassigned projects and residual conflicts.

use std::panic;
use std::thread::{self, ScopedJoinHandle};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::anneal::{
    AnnealedConstruction, Annealer, OptimizerConfig, ProposeCandidate, RelocationMove,
    RunMonitor, StrategyKind, TerminationReason, TracingMonitor,
};
use crate::compact::{CompactionReport, Compactor};
use crate::conflict::detect_conflicts;
use crate::construction::{Construction, FairnessBuilder};
use crate::error::{SchedulingError, SchedulingResult};
use crate::fitness::{evaluate, Energy};
use crate::models::{Conflict, Problem, ProblemData, Schedule};

/// Result of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best schedule found.
    pub schedule: Schedule,
    /// Energy of `schedule`.
    pub energy: Energy,
    pub iterations_run: usize,
    pub termination_reason: TerminationReason,
    /// Projects without an assignment in `schedule`, in catalog order.
    pub unassigned_project_ids: Vec<String>,
    /// Conflicts still present in `schedule`.
    pub residual_conflicts: Vec<Conflict>,
    /// Best energy after each iteration (non-increasing).
    pub best_energy_trace: Vec<f64>,
    pub reheats: usize,
    /// Compaction applied to `schedule`, if any was kept.
    pub compaction: Option<CompactionReport>,
    /// Seed of the run's random stream.
    pub seed: u64,
}

impl OptimizationResult {
    /// Lowest-energy result; the earliest wins ties.
    pub fn best_of(results: impl IntoIterator<Item = Self>) -> Option<Self> {
        results.into_iter().fold(None, |best, result| match best {
            Some(b) if b.energy.total.total_cmp(&result.energy.total).is_le() => Some(b),
            _ => Some(result),
        })
    }
}

/// Scheduling engine over one validated catalog.
///
/// # Example
/// ```
/// use u_jury::anneal::OptimizerConfig;
/// use u_jury::models::{Classroom, Instructor, ProblemData, Project, Timeslot};
/// use u_jury::Scheduler;
///
/// let data = ProblemData::new(
///     vec![Project::final_presentation("P1", "I1"), Project::interim("P2", "I2")],
///     vec![Instructor::faculty("I1"), Instructor::faculty("I2")],
///     vec![Classroom::new("C1")],
///     vec![Timeslot::new("T1", "09:00"), Timeslot::new("T2", "09:30")],
/// );
/// let scheduler = Scheduler::initialize(data).unwrap();
/// let result = scheduler
///     .run(&OptimizerConfig::default().with_seed(1).with_max_iterations(20))
///     .unwrap();
/// assert!(result.unassigned_project_ids.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    problem: Problem,
}

impl Scheduler {
    /// Validates a catalog.
    ///
    /// # Errors
    /// `InsufficientData` if any catalog is empty, `InvalidData` if
    /// records are inconsistent.
    pub fn initialize(data: ProblemData) -> SchedulingResult<Self> {
        let problem = Problem::new(data)?;
        info!(
            projects = problem.projects().len(),
            instructors = problem.instructors().len(),
            classrooms = problem.classrooms().len(),
            timeslots = problem.timeslots().len(),
            "catalog loaded"
        );
        Ok(Self { problem })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Deterministic fairness construction.
    pub fn construct(&self) -> Construction {
        FairnessBuilder::new(&self.problem).build()
    }

    /// Runs one optimization, logging progress through `tracing`.
    pub fn run(&self, config: &OptimizerConfig) -> SchedulingResult<OptimizationResult> {
        self.run_with_monitor(config, &mut TracingMonitor::new())
    }

    /// Runs one optimization configured by an option map.
    ///
    /// # Errors
    /// `InvalidConfiguration` for unknown keys or out-of-range values.
    pub fn run_with_options(
        &self,
        options: &serde_json::Value,
    ) -> SchedulingResult<OptimizationResult> {
        let config = OptimizerConfig::from_json(options)?;
        self.run(&config)
    }

    /// Runs one optimization, reporting to `monitor`.
    pub fn run_with_monitor(
        &self,
        config: &OptimizerConfig,
        monitor: &mut dyn RunMonitor,
    ) -> SchedulingResult<OptimizationResult> {
        config.validate()?;
        let seed = config.rng_seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);

        let construction = self.construct();
        if !construction.unassigned.is_empty() {
            warn!(
                count = construction.unassigned.len(),
                "construction left projects unassigned"
            );
        }

        let strategy: &dyn ProposeCandidate = match config.strategy {
            StrategyKind::AnnealedConstruction => &AnnealedConstruction,
            StrategyKind::Relocation => &RelocationMove,
        };
        let outcome = Annealer::new(&self.problem, config, strategy).run(
            construction.schedule,
            seed,
            &mut rng,
            monitor,
        );

        let mut schedule = outcome.best;
        let mut energy = outcome.best_energy;
        let mut compaction = None;
        if outcome.iterations > 0 && config.compactor.enabled {
            let compactor = Compactor::new(config.compactor);
            let (compacted, report) = compactor.compact(&self.problem, &schedule);
            let compacted_energy = evaluate(&compacted, &self.problem, &config.weights);
            if compacted_energy.total <= energy.total {
                schedule = compacted;
                energy = compacted_energy;
                compaction = Some(report);
            }
        }

        let unassigned_project_ids = self
            .problem
            .projects()
            .iter()
            .filter(|p| schedule.index_of_project(&p.id).is_none())
            .map(|p| p.id.clone())
            .collect();
        let residual_conflicts = detect_conflicts(&schedule);

        Ok(OptimizationResult {
            schedule,
            energy,
            iterations_run: outcome.iterations,
            termination_reason: outcome.termination,
            unassigned_project_ids,
            residual_conflicts,
            best_energy_trace: outcome.trace,
            reheats: outcome.reheats,
            compaction,
            seed,
        })
    }

    /// Runs one independent optimization per seed on scoped threads and
    /// returns the best.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `seeds` is empty or the configuration is
    /// invalid.
    ///
    /// # Panics
    /// Re-raises the panic of a worker thread.
    pub fn run_restarts(
        &self,
        config: &OptimizerConfig,
        seeds: &[u64],
    ) -> SchedulingResult<OptimizationResult> {
        if seeds.is_empty() {
            return Err(SchedulingError::InvalidConfiguration(
                "run_restarts needs at least one seed".to_string(),
            ));
        }
        config.validate()?;

        let results: Vec<SchedulingResult<OptimizationResult>> = thread::scope(|scope| {
            let handles: Vec<_> = seeds
                .iter()
                .map(|&seed| {
                    let config = config.clone().with_seed(seed);
                    scope.spawn(move || self.run(&config))
                })
                .collect();
            join_workers(handles)
        });

        let results = results.into_iter().collect::<SchedulingResult<Vec<_>>>()?;
        OptimizationResult::best_of(results).ok_or_else(|| {
            SchedulingError::InvalidConfiguration("no restart produced a result".to_string())
        })
    }
}

/// Joins scoped workers in spawn order, resuming the first panic.
fn join_workers<T>(handles: Vec<ScopedJoinHandle<'_, T>>) -> Vec<T> {
    handles
        .into_iter()
        .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::NoopMonitor;
    use crate::models::{Classroom, Instructor, Project, Timeslot};
    use serde_json::json;

    fn data() -> ProblemData {
        ProblemData::new(
            vec![
                Project::final_presentation("A1", "A"),
                Project::final_presentation("A2", "A"),
                Project::interim("A3", "A"),
                Project::final_presentation("B1", "B"),
                Project::interim("C1", "C").as_makeup(),
            ],
            vec![
                Instructor::faculty("A"),
                Instructor::faculty("B"),
                Instructor::assistant("C"),
            ],
            vec![Classroom::new("R1"), Classroom::new("R2")],
            ["09:00", "09:30", "10:00", "10:30"]
                .iter()
                .enumerate()
                .map(|(k, start)| Timeslot::new(format!("T{}", k + 1), *start))
                .collect(),
        )
    }

    #[test]
    fn test_initialize_rejects_empty_catalog() {
        let mut empty = data();
        empty.classrooms.clear();
        assert!(matches!(
            Scheduler::initialize(empty),
            Err(SchedulingError::InsufficientData { catalog: "classroom" })
        ));
    }

    #[test]
    fn test_zero_iterations_returns_construction() {
        let scheduler = Scheduler::initialize(data()).unwrap();
        let config = OptimizerConfig::default().with_seed(3).with_max_iterations(0);
        let result = scheduler.run_with_monitor(&config, &mut NoopMonitor).unwrap();
        assert_eq!(result.schedule, scheduler.construct().schedule);
        assert_eq!(result.termination_reason.as_str(), "iteration_limit");
        assert_eq!(result.iterations_run, 0);
        assert!(result.compaction.is_none());
    }

    #[test]
    fn test_run_reports_consistent_result() {
        let scheduler = Scheduler::initialize(data()).unwrap();
        let config = OptimizerConfig::default().with_seed(8).with_max_iterations(50);
        let result = scheduler.run_with_monitor(&config, &mut NoopMonitor).unwrap();

        let rescored = evaluate(&result.schedule, scheduler.problem(), &config.weights);
        assert_eq!(rescored, result.energy);
        assert_eq!(result.residual_conflicts, detect_conflicts(&result.schedule));
        assert_eq!(result.seed, 8);
        assert!(result.iterations_run > 0);
        assert!(result.best_energy_trace.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_run_with_options_rejects_unknown_key() {
        let scheduler = Scheduler::initialize(data()).unwrap();
        let err = scheduler
            .run_with_options(&json!({ "swarm_size": 30 }))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_invalid_config_rejected_at_entry() {
        let scheduler = Scheduler::initialize(data()).unwrap();
        let config = OptimizerConfig {
            cooling_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            scheduler.run(&config),
            Err(SchedulingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_restarts_pick_best() {
        let scheduler = Scheduler::initialize(data()).unwrap();
        let config = OptimizerConfig::default().with_max_iterations(20);
        let best = scheduler.run_restarts(&config, &[1, 2, 3]).unwrap();
        for seed in [1, 2, 3] {
            let single = scheduler.run(&config.clone().with_seed(seed)).unwrap();
            assert!(best.energy.total <= single.energy.total);
        }
        assert!(scheduler.run_restarts(&config, &[]).is_err());
    }

    #[test]
    fn test_join_workers_keeps_spawn_order() {
        let values = thread::scope(|scope| {
            let handles = (0..4).map(|k| scope.spawn(move || k * 10)).collect();
            join_workers(handles)
        });
        assert_eq!(values, vec![0, 10, 20, 30]);
    }

    #[test]
    #[should_panic(expected = "worker failed")]
    fn test_worker_panic_propagates() {
        thread::scope(|scope| {
            let handles = vec![
                scope.spawn(|| 1),
                scope.spawn(|| -> i32 { panic!("worker failed") }),
            ];
            join_workers(handles)
        });
    }

    #[test]
    fn test_best_of_prefers_earliest_on_ties() {
        let scheduler = Scheduler::initialize(data()).unwrap();
        let config = OptimizerConfig::default().with_max_iterations(0);
        let a = scheduler.run(&config.clone().with_seed(1)).unwrap();
        let b = scheduler.run(&config.with_seed(2)).unwrap();
        let best = OptimizationResult::best_of([a, b]).unwrap();
        assert_eq!(best.seed, 1);
        assert!(OptimizationResult::best_of(Vec::new()).is_none());
    }
}
