//! Optimizer configuration.

use serde::{Deserialize, Serialize};

use crate::compact::CompactorConfig;
use crate::error::{SchedulingError, SchedulingResult};
use crate::fitness::EnergyWeights;

/// How the temperature decreases between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoolingStrategy {
    /// `T ← T × cooling_rate`.
    #[default]
    Exponential,
    /// `T ← T − (T0 − Tf) / max_iterations`.
    Linear,
    /// Slow cooling while the best energy keeps improving, faster otherwise.
    Adaptive,
}

/// Candidate proposal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Re-run the construction heuristic with temperature-scaled randomness.
    #[default]
    AnnealedConstruction,
    /// Move one assignment of the current schedule to a free slot.
    Relocation,
}

/// Annealing run configuration.
///
/// Deserializes from an option map; every key is optional and unknown keys
/// are rejected.
///
/// # Example
/// ```
/// use u_jury::anneal::OptimizerConfig;
///
/// let config = OptimizerConfig::from_json(&serde_json::json!({
///     "max_iterations": 200,
///     "cooling_strategy": "Adaptive",
///     "rng_seed": 7
/// }))
/// .unwrap();
/// assert_eq!(config.max_iterations, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// The run converges once the temperature falls below this.
    pub final_temperature: f64,
    /// Multiplicative cooling factor, in (0, 1).
    pub cooling_rate: f64,
    /// Cooling schedule.
    pub cooling_strategy: CoolingStrategy,
    /// Iteration budget. Zero returns the construction unchanged.
    pub max_iterations: usize,
    /// Temperature restored by a reheat.
    pub reheat_temperature: f64,
    /// Consecutive rejections that trigger a reheat.
    pub stuck_iteration_threshold: usize,
    /// Consecutive non-improving iterations that stop the run.
    pub no_improvement_patience: usize,
    /// Seed of the run's random stream. `None` draws one from the OS.
    pub rng_seed: Option<u64>,
    /// Cooperative wall-clock budget, checked once per iteration.
    pub time_limit_ms: Option<u64>,
    /// Iterations compared by adaptive cooling.
    pub adaptive_window: usize,
    /// Candidate proposal strategy.
    pub strategy: StrategyKind,
    /// Energy weights.
    pub weights: EnergyWeights,
    /// Post-optimization compaction.
    pub compactor: CompactorConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            final_temperature: 0.1,
            cooling_rate: 0.95,
            cooling_strategy: CoolingStrategy::Exponential,
            max_iterations: 1000,
            reheat_temperature: 500.0,
            stuck_iteration_threshold: 50,
            no_improvement_patience: 200,
            rng_seed: None,
            time_limit_ms: None,
            adaptive_window: 10,
            strategy: StrategyKind::AnnealedConstruction,
            weights: EnergyWeights::default(),
            compactor: CompactorConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Builds and validates a configuration from an option map.
    pub fn from_json(options: &serde_json::Value) -> SchedulingResult<Self> {
        let config: Self = serde_json::from_value(options.clone())
            .map_err(|e| SchedulingError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds and validates a configuration from JSON text.
    pub fn from_json_str(text: &str) -> SchedulingResult<Self> {
        let options: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(&options)
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the cooling schedule.
    pub fn with_cooling(mut self, strategy: CoolingStrategy) -> Self {
        self.cooling_strategy = strategy;
        self
    }

    /// Sets the proposal strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Rejects out-of-range parameters.
    pub fn validate(&self) -> SchedulingResult<()> {
        let invalid = |message: String| Err(SchedulingError::InvalidConfiguration(message));

        let temperatures = [
            ("initial_temperature", self.initial_temperature),
            ("final_temperature", self.final_temperature),
            ("reheat_temperature", self.reheat_temperature),
        ];
        for (name, value) in temperatures {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{name} must be positive and finite, got {value}"));
            }
        }
        if self.final_temperature >= self.initial_temperature {
            return invalid(format!(
                "final_temperature {} must be below initial_temperature {}",
                self.final_temperature, self.initial_temperature
            ));
        }
        if self.reheat_temperature <= self.final_temperature {
            return invalid(format!(
                "reheat_temperature {} must be above final_temperature {}",
                self.reheat_temperature, self.final_temperature
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return invalid(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if self.stuck_iteration_threshold == 0 {
            return invalid("stuck_iteration_threshold must be positive".to_string());
        }
        if self.no_improvement_patience == 0 {
            return invalid("no_improvement_patience must be positive".to_string());
        }
        if self.adaptive_window == 0 {
            return invalid("adaptive_window must be positive".to_string());
        }
        if self.cooling_strategy == CoolingStrategy::Linear && self.max_iterations == 0 {
            return invalid("Linear cooling needs a positive max_iterations".to_string());
        }
        self.weights.validate()?;
        self.compactor.validate()?;
        Ok(())
    }
}
