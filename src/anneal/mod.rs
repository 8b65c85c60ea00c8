//! Temperature-annealed local search.
//!
//! # Components
//!
//! - [`OptimizerConfig`]: run options, deserializable from an option map
//! - [`Temperature`]: exponential, linear or adaptive cooling with reheats
//! - [`ProposeCandidate`]: candidate generation seam, implemented by
//!   [`AnnealedConstruction`] and [`RelocationMove`]
//! - [`RunMonitor`]: lifecycle hooks ([`TracingMonitor`], [`NoopMonitor`])
//! - [`Annealer`]: the loop itself
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Aarts & Korst (1989), "Simulated Annealing and Boltzmann Machines"

mod config;
mod cooling;
mod monitor;
mod optimizer;
mod strategy;

pub use config::{CoolingStrategy, OptimizerConfig, StrategyKind};
pub use cooling::Temperature;
pub use monitor::{NoopMonitor, RunMonitor, TracingMonitor};
pub use optimizer::{AnnealOutcome, Annealer, OptimizerState, TerminationReason};
pub use strategy::{AnnealedConstruction, ProposeCandidate, RelocationMove};
