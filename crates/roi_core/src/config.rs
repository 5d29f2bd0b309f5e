//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration. Values can be layered: file, then environment overrides,
//! then [`EngineConfig::validate`].
//!
//! ```
//! use roi_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [simulation]
//!     parallel_threshold = 5000
//!
//!     [cache.monte_carlo]
//!     capacity = 16
//!     ttl_secs = 600
//! "#).unwrap();
//!
//! assert_eq!(config.simulation.parallel_threshold, 5000);
//! assert_eq!(config.simulation.chunk_size, 1000);
//! assert_eq!(config.cache.monte_carlo.capacity, 16);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::math::solvers::SolverConfig;
use crate::types::ConfigError;

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Monte Carlo execution settings
    pub simulation: SimulationSettings,
    /// IRR root-finding settings
    pub solver: SolverSettings,
    /// Risk multipliers per risk level
    pub risk_premiums: RiskPremiums,
    /// Per-calculation cache policies
    pub cache: CacheSettings,
    /// Sensitivity analysis defaults
    pub sensitivity: SensitivitySettings,
}

/// Monte Carlo execution settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Iteration count above which work is distributed across threads
    pub parallel_threshold: usize,
    /// Iterations per chunk; fixes the chunk layout independently of threads
    pub chunk_size: usize,
    /// Upper bound on worker threads
    pub max_workers: usize,
    /// Seed used when a scenario does not carry one
    pub default_seed: u64,
    /// Wall-clock budget per run in milliseconds
    pub timeout_ms: Option<u64>,
    /// Soft cap on iterations per run
    pub iteration_cap: Option<usize>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            parallel_threshold: 2_000,
            chunk_size: 1_000,
            max_workers: 16,
            default_seed: 42,
            timeout_ms: None,
            iteration_cap: None,
        }
    }
}

impl SimulationSettings {
    /// Timeout as a [`Duration`], if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// IRR root-finding settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    /// Lower end of the rate bracket
    pub lower: f64,
    /// Upper end of the rate bracket
    pub upper: f64,
    /// Iteration cap for Newton and bisection passes
    pub max_iterations: usize,
    /// Convergence tolerance
    pub tolerance: f64,
    /// Grid cells used to locate the first sign change
    pub scan_steps: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            lower: -0.99,
            upper: 10.0,
            max_iterations: 100,
            tolerance: 1e-10,
            scan_steps: 1_000,
        }
    }
}

impl SolverSettings {
    /// Solver configuration derived from these settings.
    pub fn solver_config(&self) -> SolverConfig<f64> {
        SolverConfig {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }
}

/// Multipliers applied to the excess return for each risk level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskPremiums {
    /// Low risk
    pub low: f64,
    /// Medium risk
    pub medium: f64,
    /// High risk
    pub high: f64,
}

impl Default for RiskPremiums {
    fn default() -> Self {
        Self {
            low: 0.5,
            medium: 1.0,
            high: 1.8,
        }
    }
}

/// Capacity and default time-to-live for one cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachePolicy {
    /// Maximum number of entries
    pub capacity: usize,
    /// Default time-to-live in seconds
    pub ttl_secs: u64,
}

impl CachePolicy {
    /// Create a policy.
    pub const fn new(capacity: usize, ttl_secs: u64) -> Self {
        Self { capacity, ttl_secs }
    }

    /// TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Cache policies per calculation kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    /// Net present value
    pub npv: CachePolicy,
    /// Internal rate of return
    pub irr: CachePolicy,
    /// Monte Carlo simulations
    pub monte_carlo: CachePolicy,
    /// Sensitivity analyses
    pub sensitivity: CachePolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            npv: CachePolicy::new(1_024, 30 * 60),
            irr: CachePolicy::new(1_024, 30 * 60),
            monte_carlo: CachePolicy::new(64, 60 * 60),
            sensitivity: CachePolicy::new(256, 30 * 60),
        }
    }
}

/// Sensitivity analysis defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensitivitySettings {
    /// Perturbation in percent when the caller gives none
    pub default_range_percent: f64,
}

impl Default for SensitivitySettings {
    fn default() -> Self {
        Self {
            default_range_percent: 10.0,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Load from file, apply environment overrides and validate.
    pub fn load_with_env_and_validate(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }

    /// Apply `ROI_*` environment variable overrides.
    ///
    /// Recognised: `ROI_PARALLEL_THRESHOLD`, `ROI_CHUNK_SIZE`,
    /// `ROI_MAX_WORKERS`, `ROI_SEED`, `ROI_TIMEOUT_MS`. Unparseable values
    /// leave the setting unchanged.
    pub fn with_env_override(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        let sim = &mut self.simulation;
        if let Some(v) = parsed(&lookup, "ROI_PARALLEL_THRESHOLD") {
            sim.parallel_threshold = v;
        }
        if let Some(v) = parsed(&lookup, "ROI_CHUNK_SIZE") {
            sim.chunk_size = v;
        }
        if let Some(v) = parsed(&lookup, "ROI_MAX_WORKERS") {
            sim.max_workers = v;
        }
        if let Some(v) = parsed(&lookup, "ROI_SEED") {
            sim.default_seed = v;
        }
        if let Some(v) = parsed(&lookup, "ROI_TIMEOUT_MS") {
            sim.timeout_ms = Some(v);
        }
        self
    }

    /// Validate every setting, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let sim = &self.simulation;
        if sim.chunk_size == 0 {
            errors.push("simulation.chunk_size must be greater than 0".to_string());
        }
        if sim.max_workers == 0 {
            errors.push("simulation.max_workers must be greater than 0".to_string());
        }
        if sim.timeout_ms == Some(0) {
            errors.push("simulation.timeout_ms must be greater than 0 when set".to_string());
        }
        if sim.iteration_cap == Some(0) {
            errors.push("simulation.iteration_cap must be greater than 0 when set".to_string());
        }

        let solver = &self.solver;
        if !(solver.lower > -1.0 && solver.lower < solver.upper && solver.upper.is_finite()) {
            errors.push(format!(
                "solver bracket [{}, {}] must satisfy -1 < lower < upper",
                solver.lower, solver.upper
            ));
        }
        if solver.max_iterations == 0 {
            errors.push("solver.max_iterations must be greater than 0".to_string());
        }
        if !(solver.tolerance > 0.0 && solver.tolerance.is_finite()) {
            errors.push(format!(
                "solver.tolerance {} must be positive",
                solver.tolerance
            ));
        }
        if solver.scan_steps == 0 {
            errors.push("solver.scan_steps must be greater than 0".to_string());
        }

        let premiums = &self.risk_premiums;
        for (name, value) in [
            ("low", premiums.low),
            ("medium", premiums.medium),
            ("high", premiums.high),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(format!("risk_premiums.{name} {value} must be non-negative"));
            }
        }

        for (name, policy) in [
            ("npv", self.cache.npv),
            ("irr", self.cache.irr),
            ("monte_carlo", self.cache.monte_carlo),
            ("sensitivity", self.cache.sensitivity),
        ] {
            if policy.capacity == 0 {
                errors.push(format!("cache.{name}.capacity must be greater than 0"));
            }
            if policy.ttl_secs == 0 {
                errors.push(format!("cache.{name}.ttl_secs must be greater than 0"));
            }
        }

        let range = self.sensitivity.default_range_percent;
        if !(range > 0.0 && range < 100.0) {
            errors.push(format!(
                "sensitivity.default_range_percent {range} must be in (0, 100)"
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}
