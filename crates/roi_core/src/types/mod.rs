//! Core value types shared by every layer.
//!
//! - [`CashFlowSeries`]: validated per-period amounts
//! - [`ScenarioDefinition`], [`Variable`], [`Distribution`]: Monte Carlo inputs
//! - [`SimulationResult`], [`SensitivityResult`]: scenario outputs
//! - [`EngineError`] and the lower-level error enums

pub mod cash_flow;
pub mod error;
pub mod results;
pub mod scenario;

pub use cash_flow::CashFlowSeries;
pub use error::{ConfigError, CorrelationError, EngineError, SolverError};
pub use results::{
    Completion, PartialReason, Percentile, SensitivityEntry, SensitivityResult, SimulationResult,
    PERCENTILE_LADDER,
};
pub use scenario::{Distribution, ScenarioDefinition, Variable, MAX_ITERATIONS};
