//! Temperature schedule with reheating.

use std::collections::VecDeque;

use super::config::{CoolingStrategy, OptimizerConfig};

/// Improvement over the adaptive window above which cooling slows down.
const ADAPTIVE_IMPROVEMENT: f64 = 0.05;

/// Current temperature and the rule that lowers it.
#[derive(Debug, Clone)]
pub struct Temperature {
    current: f64,
    initial: f64,
    floor: f64,
    rate: f64,
    linear_step: f64,
    reheat_to: f64,
    strategy: CoolingStrategy,
    window: usize,
    history: VecDeque<f64>,
}

impl Temperature {
    /// Starts at `config.initial_temperature`.
    pub fn new(config: &OptimizerConfig) -> Self {
        let linear_step = if config.max_iterations > 0 {
            (config.initial_temperature - config.final_temperature) / config.max_iterations as f64
        } else {
            0.0
        };
        Self {
            current: config.initial_temperature,
            initial: config.initial_temperature,
            floor: config.final_temperature,
            rate: config.cooling_rate,
            linear_step,
            reheat_to: config.reheat_temperature,
            strategy: config.cooling_strategy,
            window: config.adaptive_window,
            history: VecDeque::with_capacity(config.adaptive_window + 1),
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// `T / T0` clamped to `[0, 1]`; 1 is hottest.
    pub fn heat(&self) -> f64 {
        (self.current / self.initial).clamp(0.0, 1.0)
    }

    /// Whether the temperature has dropped below the final temperature.
    pub fn is_frozen(&self) -> bool {
        self.current < self.floor
    }

    /// Lowers the temperature by one step.
    ///
    /// `best_energy` feeds the adaptive schedule and is ignored otherwise.
    pub fn cool(&mut self, best_energy: f64) {
        self.current = match self.strategy {
            CoolingStrategy::Exponential => self.current * self.rate,
            CoolingStrategy::Linear => (self.current - self.linear_step).max(0.0),
            CoolingStrategy::Adaptive => self.current * self.adaptive_factor(best_energy),
        };
    }

    /// Restores the reheat temperature.
    pub fn reheat(&mut self) {
        self.current = self.reheat_to;
        self.history.clear();
    }

    fn adaptive_factor(&mut self, best_energy: f64) -> f64 {
        self.history.push_back(best_energy);
        if self.history.len() > self.window + 1 {
            self.history.pop_front();
        }
        let (Some(&oldest), Some(&newest)) = (self.history.front(), self.history.back()) else {
            return self.rate;
        };
        let improvement = (oldest - newest) / oldest.abs().max(f64::EPSILON);
        if self.history.len() > self.window && improvement > ADAPTIVE_IMPROVEMENT {
            1.0 - (1.0 - self.rate) / 4.0
        } else {
            self.rate
        }
    }
}
