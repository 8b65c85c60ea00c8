//! Run lifecycle hooks.
//!
//! The optimizer reports progress through an injected [`RunMonitor`]
//! instead of a global logger, so concurrent runs never share state.

use tracing::{debug, info, trace};

use super::optimizer::TerminationReason;
use crate::fitness::Energy;

/// Observer of an optimizer run. Every hook defaults to doing nothing.
pub trait RunMonitor {
    /// Called once, with the energy of the initial schedule.
    fn on_start(&mut self, _initial: &Energy, _seed: u64) {}

    /// Called after every iteration.
    fn on_iteration(&mut self, _iteration: usize, _temperature: f64, _candidate: f64, _best: f64) {}

    /// Called when an iteration improves the best schedule.
    fn on_new_best(&mut self, _iteration: usize, _best: &Energy) {}

    /// Called when the temperature is reset after a run of rejections.
    fn on_reheat(&mut self, _iteration: usize, _temperature: f64) {}

    /// Called once when the run stops.
    fn on_finish(&mut self, _reason: TerminationReason, _iterations: usize, _best: &Energy) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl RunMonitor for NoopMonitor {}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMonitor;

impl TracingMonitor {
    pub fn new() -> Self {
        Self
    }
}

impl RunMonitor for TracingMonitor {
    fn on_start(&mut self, initial: &Energy, seed: u64) {
        info!(seed, initial_energy = initial.total, "annealing started");
    }

    fn on_iteration(&mut self, iteration: usize, temperature: f64, candidate: f64, best: f64) {
        trace!(iteration, temperature, candidate, best, "iteration");
    }

    fn on_new_best(&mut self, iteration: usize, best: &Energy) {
        debug!(iteration, energy = best.total, "new best schedule");
    }

    fn on_reheat(&mut self, iteration: usize, temperature: f64) {
        debug!(iteration, temperature, "reheated");
    }

    fn on_finish(&mut self, reason: TerminationReason, iterations: usize, best: &Energy) {
        info!(
            reason = %reason,
            iterations,
            best_energy = best.total,
            "annealing finished"
        );
    }
}
