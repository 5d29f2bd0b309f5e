//! # roi_core: Foundation for the ROI Scenario Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! roi_core is the bottom layer of the workspace, providing:
//! - Validated value types: `CashFlowSeries`, `ScenarioDefinition` (`types`)
//! - Result types: `SimulationResult`, `SensitivityResult` (`types::results`)
//! - Error taxonomy: `EngineError`, `SolverError`, `CorrelationError`, `ConfigError` (`types::error`)
//! - Root finders, statistics, correlation matrices and the normal CDF (`math`)
//! - `EngineConfig` with TOML loading and environment overrides (`config`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 depends on no other roi_* crate, with minimal external
//! dependencies:
//! - num-traits: generic solver arithmetic
//! - thiserror: error enums
//! - serde / toml: configuration and scenario definitions
//!
//! ## Usage Examples
//!
//! ```rust
//! use roi_core::math::statistics::{percentile_sorted, sort_samples};
//! use roi_core::types::CashFlowSeries;
//!
//! let flows = CashFlowSeries::new(vec![-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0]).unwrap();
//! assert_eq!(flows.total(), 500.0);
//!
//! let mut samples = vec![3.0, 1.0, 2.0];
//! sort_samples(&mut samples);
//! assert_eq!(percentile_sorted(&samples, 0.5).unwrap(), 2.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod math;
pub mod types;
