//! Temperature-annealed local search.
//!
//! # States
//!
//! `Initializing → Annealing → Finished(reason)`
//!
//! # Iteration
//!
//! 1. Propose a candidate with the configured strategy.
//! 2. Repair its conflicts (neighborhood shrinks as the run cools).
//! 3. Evaluate. A strictly better candidate replaces the best schedule;
//!    otherwise Metropolis acceptance against the best decides whether it
//!    becomes the current schedule, and a rejection counts as stuck.
//! 4. Cool, and reheat once the stuck counter exceeds its threshold.
//!
//! Stop checks run before every iteration, in this order: iteration budget,
//! wall-clock deadline, frozen temperature, exhausted patience.
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::OptimizerConfig;
use super::cooling::Temperature;
use super::monitor::RunMonitor;
use super::strategy::ProposeCandidate;
use crate::conflict::{detect_conflicts, ConflictResolver, ResolveContext};
use crate::fitness::{evaluate, Energy};
use crate::models::{Problem, Schedule};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// `max_iterations` reached.
    IterationLimit,
    /// Temperature fell below `final_temperature`.
    Converged,
    /// `no_improvement_patience` iterations without a new best.
    NoImprovement,
    /// `time_limit_ms` elapsed.
    Deadline,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::IterationLimit => "iteration_limit",
            TerminationReason::Converged => "converged",
            TerminationReason::NoImprovement => "no_improvement",
            TerminationReason::Deadline => "deadline",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimizer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerState {
    Initializing,
    Annealing,
    Finished(TerminationReason),
}

/// Best schedule found by an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealOutcome {
    pub best: Schedule,
    pub best_energy: Energy,
    pub iterations: usize,
    pub termination: TerminationReason,
    /// Best energy after each iteration.
    pub trace: Vec<f64>,
    pub reheats: usize,
}

/// Runs the annealing loop over a fixed catalog.
pub struct Annealer<'a> {
    problem: &'a Problem,
    config: &'a OptimizerConfig,
    strategy: &'a dyn ProposeCandidate,
    resolver: ConflictResolver,
    state: OptimizerState,
}

/// Counters carried across iterations.
#[derive(Debug, Default)]
struct Progress {
    iterations: usize,
    stuck: usize,
    since_improvement: usize,
    reheats: usize,
}

impl<'a> Annealer<'a> {
    pub fn new(
        problem: &'a Problem,
        config: &'a OptimizerConfig,
        strategy: &'a dyn ProposeCandidate,
    ) -> Self {
        Self {
            problem,
            config,
            strategy,
            resolver: ConflictResolver::new(),
            state: OptimizerState::Initializing,
        }
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Anneals from `initial`. The configuration must already be validated.
    ///
    /// `seed` is only reported to the monitor; `rng` carries the stream.
    pub fn run(
        &mut self,
        initial: Schedule,
        seed: u64,
        rng: &mut StdRng,
        monitor: &mut dyn RunMonitor,
    ) -> AnnealOutcome {
        self.state = OptimizerState::Initializing;
        let config = self.config;
        let weights = &config.weights;

        let mut best_energy = evaluate(&initial, self.problem, weights);
        let mut best = initial;
        let mut current = best.clone();
        monitor.on_start(&best_energy, seed);
        debug!(strategy = self.strategy.name(), "annealing");

        let deadline = config
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let mut temperature = Temperature::new(config);
        let mut progress = Progress::default();
        let mut trace = Vec::with_capacity(config.max_iterations.min(1 << 16));

        self.state = OptimizerState::Annealing;
        while self.state == OptimizerState::Annealing {
            if let Some(reason) = self.stop_reason(&progress, &temperature, deadline) {
                self.state = OptimizerState::Finished(reason);
                continue;
            }
            progress.iterations += 1;

            let proposal = self
                .strategy
                .propose(self.problem, &current, temperature.heat(), rng);
            let conflicts = detect_conflicts(&proposal);
            let candidate = if conflicts.is_empty() {
                proposal
            } else {
                let context = ResolveContext {
                    temperature: temperature.current(),
                    initial_temperature: temperature.initial(),
                    progress: progress.iterations as f64 / config.max_iterations.max(1) as f64,
                };
                self.resolver
                    .resolve(self.problem, proposal, conflicts, &context, rng)
                    .schedule
            };
            let energy = evaluate(&candidate, self.problem, weights);

            if energy.total < best_energy.total {
                best_energy = energy;
                best = candidate.clone();
                current = candidate;
                progress.stuck = 0;
                progress.since_improvement = 0;
                monitor.on_new_best(progress.iterations, &best_energy);
            } else {
                progress.since_improvement += 1;
                let delta = energy.total - best_energy.total;
                if metropolis(delta, temperature.current(), rng) {
                    current = candidate;
                } else {
                    progress.stuck += 1;
                }
            }

            trace.push(best_energy.total);
            monitor.on_iteration(
                progress.iterations,
                temperature.current(),
                energy.total,
                best_energy.total,
            );

            temperature.cool(best_energy.total);
            if progress.stuck > config.stuck_iteration_threshold {
                temperature.reheat();
                progress.stuck = 0;
                progress.reheats += 1;
                monitor.on_reheat(progress.iterations, temperature.current());
            }
        }

        let termination = match self.state {
            OptimizerState::Finished(reason) => reason,
            _ => TerminationReason::IterationLimit,
        };
        monitor.on_finish(termination, progress.iterations, &best_energy);

        AnnealOutcome {
            best,
            best_energy,
            iterations: progress.iterations,
            termination,
            trace,
            reheats: progress.reheats,
        }
    }

    fn stop_reason(
        &self,
        progress: &Progress,
        temperature: &Temperature,
        deadline: Option<Instant>,
    ) -> Option<TerminationReason> {
        if progress.iterations >= self.config.max_iterations {
            Some(TerminationReason::IterationLimit)
        } else if deadline.is_some_and(|d| Instant::now() >= d) {
            Some(TerminationReason::Deadline)
        } else if temperature.is_frozen() {
            Some(TerminationReason::Converged)
        } else if progress.since_improvement >= self.config.no_improvement_patience {
            Some(TerminationReason::NoImprovement)
        } else {
            None
        }
    }
}

/// Metropolis criterion for a non-improving move of size `delta >= 0`.
fn metropolis<R: Rng>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if temperature <= 0.0 || !delta.is_finite() {
        return false;
    }
    rng.random::<f64>() < (-delta / temperature).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::{AnnealedConstruction, CoolingStrategy, NoopMonitor, RelocationMove};
    use crate::construction::FairnessBuilder;
    use crate::models::{Classroom, Instructor, ProblemData, Project, Timeslot};
    use rand::SeedableRng;

    fn problem() -> Problem {
        let projects = (1..=4)
            .map(|k| Project::final_presentation(format!("A{k}"), "A"))
            .chain((1..=2).map(|k| Project::interim(format!("B{k}"), "B")))
            .chain([Project::final_presentation("C1", "C")])
            .collect();
        Problem::new(ProblemData::new(
            projects,
            vec![
                Instructor::faculty("A"),
                Instructor::faculty("B"),
                Instructor::assistant("C"),
            ],
            vec![Classroom::new("R1"), Classroom::new("R2")],
            (0..6)
                .map(|k| Timeslot::new(format!("T{}", k + 1), format!("{:02}:00", 9 + k)))
                .collect(),
        ))
        .unwrap()
    }

    fn run(config: &OptimizerConfig, strategy: &dyn ProposeCandidate, seed: u64) -> AnnealOutcome {
        let p = problem();
        let initial = FairnessBuilder::new(&p).build().schedule;
        let mut rng = StdRng::seed_from_u64(seed);
        Annealer::new(&p, config, strategy).run(initial, seed, &mut rng, &mut NoopMonitor)
    }

    #[test]
    fn test_metropolis() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!metropolis(1.0, 0.0, &mut rng));
        assert!(metropolis(0.0, 1.0, &mut rng));
        let accepted = (0..1000).filter(|_| metropolis(1e6, 1.0, &mut rng)).count();
        assert_eq!(accepted, 0);
    }

    #[test]
    fn test_iteration_limit_and_monotone_trace() {
        let config = OptimizerConfig {
            max_iterations: 40,
            no_improvement_patience: 1000,
            ..Default::default()
        };
        let outcome = run(&config, &AnnealedConstruction, 5);
        assert_eq!(outcome.termination, TerminationReason::IterationLimit);
        assert_eq!(outcome.iterations, 40);
        assert_eq!(outcome.trace.len(), 40);
        assert!(outcome.trace.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(*outcome.trace.last().unwrap(), outcome.best_energy.total);
    }

    #[test]
    fn test_best_never_worse_than_initial() {
        let p = problem();
        let initial = FairnessBuilder::new(&p).build().schedule;
        let initial_energy = evaluate(&initial, &p, &Default::default()).total;
        let config = OptimizerConfig {
            max_iterations: 30,
            ..Default::default()
        };
        let outcome = run(&config, &RelocationMove, 3);
        assert!(outcome.best_energy.total <= initial_energy);
    }

    #[test]
    fn test_converges_when_frozen() {
        let config = OptimizerConfig {
            initial_temperature: 10.0,
            final_temperature: 5.0,
            cooling_rate: 0.5,
            reheat_temperature: 8.0,
            max_iterations: 100,
            ..Default::default()
        };
        let outcome = run(&config, &AnnealedConstruction, 1);
        assert_eq!(outcome.termination, TerminationReason::Converged);
        assert_eq!(outcome.iterations, 2);
    }

    #[test]
    fn test_no_improvement_patience() {
        let config = OptimizerConfig {
            max_iterations: 10_000,
            cooling_rate: 0.999,
            final_temperature: 1e-6,
            no_improvement_patience: 5,
            stuck_iteration_threshold: 10_000,
            ..Default::default()
        };
        let outcome = run(&config, &AnnealedConstruction, 2);
        assert_eq!(outcome.termination, TerminationReason::NoImprovement);
        assert!(outcome.iterations < 10_000);
    }

    #[test]
    fn test_deadline() {
        let config = OptimizerConfig {
            max_iterations: usize::MAX,
            cooling_rate: 0.999_999,
            final_temperature: 1e-9,
            no_improvement_patience: usize::MAX,
            time_limit_ms: Some(0),
            ..Default::default()
        };
        let outcome = run(&config, &AnnealedConstruction, 2);
        assert_eq!(outcome.termination, TerminationReason::Deadline);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_reheats_when_stuck() {
        let config = OptimizerConfig {
            max_iterations: 60,
            cooling_strategy: CoolingStrategy::Linear,
            stuck_iteration_threshold: 1,
            no_improvement_patience: 1000,
            initial_temperature: 1e-3,
            final_temperature: 1e-6,
            reheat_temperature: 1e-3,
            ..Default::default()
        };
        let outcome = run(&config, &RelocationMove, 4);
        assert!(outcome.reheats > 0);
    }

    #[test]
    fn test_seed_reproducible() {
        let config = OptimizerConfig {
            max_iterations: 25,
            ..Default::default()
        };
        let a = run(&config, &AnnealedConstruction, 77);
        let b = run(&config, &AnnealedConstruction, 77);
        assert_eq!(a.best, b.best);
        assert_eq!(a.trace, b.trace);
    }

    #[test]
    fn test_state_transitions() {
        let p = problem();
        let config = OptimizerConfig {
            max_iterations: 0,
            ..Default::default()
        };
        let mut annealer = Annealer::new(&p, &config, &AnnealedConstruction);
        assert_eq!(annealer.state(), OptimizerState::Initializing);
        let mut rng = StdRng::seed_from_u64(0);
        let initial = FairnessBuilder::new(&p).build().schedule;
        let outcome = annealer.run(initial.clone(), 0, &mut rng, &mut NoopMonitor);
        assert_eq!(
            annealer.state(),
            OptimizerState::Finished(TerminationReason::IterationLimit)
        );
        assert_eq!(outcome.best, initial);
        assert!(outcome.trace.is_empty());
    }
}
