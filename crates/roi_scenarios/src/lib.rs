//! # roi_scenarios: Scenario Engine (Layer 3)
//!
//! Probabilistic analysis on top of the deterministic calculator:
//!
//! - [`monte_carlo`]: seeded simulation over a [`ScenarioDefinition`]
//! - [`coordinator`]: chunked parallel execution with deterministic merging
//! - [`sensitivity`]: one-at-a-time elasticities in tornado order
//! - [`adoption`]: logistic S-curve through the current adoption level
//! - [`correlation`]: Pearson matrix over named series
//! - [`engine`]: [`AnalysisEngine`], the cached facade
//!
//! ## Reproducibility
//!
//! Every run is seeded explicitly: from the scenario when it carries a
//! seed, otherwise from `simulation.default_seed`. Chunk seeds derive from
//! the run seed and the chunk index, so the result of a run does not depend
//! on the number of worker threads.
//!
//! ## Usage Example
//!
//! ```rust
//! use roi_core::types::{Distribution, ScenarioDefinition, Variable};
//! use roi_scenarios::model::{FnModel, Sample};
//! use roi_scenarios::AnalysisEngine;
//!
//! let engine = AnalysisEngine::with_defaults();
//! let scenario = ScenarioDefinition::new(
//!     "automation",
//!     vec![
//!         Variable::new("hours_saved", Distribution::Triangular { low: 500.0, mode: 800.0, high: 1500.0 }),
//!         Variable::new("hourly_cost", Distribution::Normal { mean: 45.0, std_dev: 5.0 }),
//!     ],
//!     10_000,
//! ).unwrap();
//! let model = FnModel::new("annual_saving", |s: &Sample<'_>| {
//!     s.get_or("hours_saved", 0.0) * s.get_or("hourly_cost", 0.0)
//! });
//!
//! let result = engine.monte_carlo(&scenario, &model).unwrap();
//! assert!(result.p5() < result.mean && result.mean < result.p95());
//! ```
//!
//! [`ScenarioDefinition`]: roi_core::types::ScenarioDefinition

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod adoption;
pub mod coordinator;
pub mod correlation;
pub mod engine;
pub mod model;
pub mod monte_carlo;
pub mod rng;
pub mod sampling;
pub mod sensitivity;

pub use adoption::{adoption_curve, adoption_s_curve, AdoptionCurve};
pub use coordinator::{ChunkProgress, ExecutionCoordinator};
pub use correlation::{correlation_matrix, SeriesCorrelation};
pub use engine::AnalysisEngine;
pub use model::{FnModel, InvestmentNpvModel, LinearModel, OutcomeModel, Sample};
pub use monte_carlo::{monte_carlo, MonteCarloSimulator};
pub use sensitivity::{sensitivity_analysis, BaseCase};
