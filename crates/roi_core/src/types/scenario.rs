//! Scenario definitions: uncertain variables and their distributions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::EngineError;
use crate::math::correlation::CorrelationMatrix;
use crate::math::distributions::norm_cdf;

/// Largest iteration count a single scenario may request.
pub const MAX_ITERATIONS: usize = 200_000;

/// Marginal distribution of an uncertain input.
///
/// Parameterised as `(mean, std_dev)`, `(low, high)` and
/// `(low, mode, high)` respectively.
///
/// # Examples
/// ```
/// use roi_core::types::Distribution;
///
/// let d: Distribution = toml::from_str(
///     "kind = \"triangular\"\nlow = 1.0\nmode = 2.0\nhigh = 6.0",
/// ).unwrap();
/// assert_eq!(d.mean(), 3.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Gaussian with the given mean and standard deviation.
    Normal {
        /// Location
        mean: f64,
        /// Scale, `>= 0`
        std_dev: f64,
    },
    /// Continuous uniform on `[low, high]`.
    Uniform {
        /// Lower bound
        low: f64,
        /// Upper bound, `> low`
        high: f64,
    },
    /// Triangular on `[low, high]` peaking at `mode`.
    Triangular {
        /// Lower bound
        low: f64,
        /// Peak, `low <= mode <= high`
        mode: f64,
        /// Upper bound, `> low`
        high: f64,
    },
}

impl Distribution {
    /// Check the parameters, naming `variable` in the error.
    pub fn validate(&self, variable: &str) -> Result<(), EngineError> {
        let finite = |vals: &[f64]| vals.iter().all(|v| v.is_finite());
        let reason = match *self {
            Distribution::Normal { mean, std_dev } => {
                if !finite(&[mean, std_dev]) {
                    Some("normal parameters must be finite".to_string())
                } else if std_dev < 0.0 {
                    Some(format!("std_dev {std_dev} must be non-negative"))
                } else {
                    None
                }
            }
            Distribution::Uniform { low, high } => {
                if !finite(&[low, high]) {
                    Some("uniform bounds must be finite".to_string())
                } else if low >= high {
                    Some(format!("uniform requires low < high, got [{low}, {high}]"))
                } else {
                    None
                }
            }
            Distribution::Triangular { low, mode, high } => {
                if !finite(&[low, mode, high]) {
                    Some("triangular parameters must be finite".to_string())
                } else if low >= high || mode < low || mode > high {
                    Some(format!(
                        "triangular requires low <= mode <= high and low < high, got ({low}, {mode}, {high})"
                    ))
                } else {
                    None
                }
            }
        };
        match reason {
            Some(reason) => Err(EngineError::invalid(variable, reason)),
            None => Ok(()),
        }
    }

    /// Expected value.
    pub fn mean(&self) -> f64 {
        match *self {
            Distribution::Normal { mean, .. } => mean,
            Distribution::Uniform { low, high } => 0.5 * (low + high),
            Distribution::Triangular { low, mode, high } => (low + mode + high) / 3.0,
        }
    }

    /// Map a standard normal draw onto this marginal (Gaussian copula).
    ///
    /// Normal variables scale `w` directly; the others apply their inverse
    /// CDF to `Φ(w)`.
    pub fn from_standard_normal(&self, w: f64) -> f64 {
        match *self {
            Distribution::Normal { mean, std_dev } => mean + std_dev * w,
            _ => self.quantile_bounded(norm_cdf(w)),
        }
    }

    /// Inverse CDF for the bounded marginals. Normal is handled by
    /// [`from_standard_normal`](Self::from_standard_normal).
    fn quantile_bounded(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        match *self {
            Distribution::Normal { mean, .. } => mean,
            Distribution::Uniform { low, high } => low + u * (high - low),
            Distribution::Triangular { low, mode, high } => {
                let range = high - low;
                let split = (mode - low) / range;
                if u < split {
                    low + (u * range * (mode - low)).sqrt()
                } else {
                    high - ((1.0 - u) * range * (high - mode)).sqrt()
                }
            }
        }
    }
}

/// A named uncertain input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Identifier used by outcome models to look the value up
    pub name: String,
    /// Marginal distribution
    pub distribution: Distribution,
}

impl Variable {
    /// Create a variable.
    pub fn new(name: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            distribution,
        }
    }
}

/// A set of uncertain variables plus run parameters for Monte Carlo.
///
/// # Examples
/// ```
/// use roi_core::types::{Distribution, ScenarioDefinition, Variable};
///
/// let scenario = ScenarioDefinition::new(
///     "savings",
///     vec![Variable::new("gain", Distribution::Normal { mean: 0.2, std_dev: 0.05 })],
///     5_000,
/// )
/// .unwrap()
/// .with_seed(7);
/// assert_eq!(scenario.seed, Some(7));
/// assert!(ScenarioDefinition::new("empty", vec![], 0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Human-readable label
    pub name: String,
    /// Uncertain inputs, in correlation-matrix order
    pub variables: Vec<Variable>,
    /// Number of Monte Carlo iterations, `1..=200_000`
    pub iterations: usize,
    /// Optional correlation between `variables`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationMatrix>,
    /// Explicit seed; the engine default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ScenarioDefinition {
    /// Create and validate a scenario without correlation.
    pub fn new(
        name: impl Into<String>,
        variables: Vec<Variable>,
        iterations: usize,
    ) -> Result<Self, EngineError> {
        let scenario = Self {
            name: name.into(),
            variables,
            iterations,
            correlation: None,
            seed: None,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Attach a correlation matrix, re-validating dimensions and
    /// positive-definiteness.
    pub fn with_correlation(mut self, matrix: CorrelationMatrix) -> Result<Self, EngineError> {
        self.correlation = Some(matrix);
        self.validate()?;
        Ok(self)
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every invariant. Deserialised scenarios must call this before
    /// use.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(EngineError::invalid(
                "iterations",
                format!(
                    "must be in 1..={MAX_ITERATIONS}, got {}",
                    self.iterations
                ),
            ));
        }
        if self.variables.is_empty() {
            return Err(EngineError::invalid(
                "variables",
                "scenario needs at least one variable",
            ));
        }

        let mut seen = HashSet::with_capacity(self.variables.len());
        for var in &self.variables {
            if var.name.is_empty() {
                return Err(EngineError::invalid("variables", "variable name is empty"));
            }
            if !seen.insert(var.name.as_str()) {
                return Err(EngineError::invalid(
                    "variables",
                    format!("duplicate variable '{}'", var.name),
                ));
            }
            var.distribution.validate(&var.name)?;
        }

        if let Some(matrix) = &self.correlation {
            if matrix.dim() != self.variables.len() {
                return Err(EngineError::invalid(
                    "correlation_matrix",
                    format!(
                        "dimension {} does not match {} variables",
                        matrix.dim(),
                        self.variables.len()
                    ),
                ));
            }
            matrix.cholesky()?;
        }
        Ok(())
    }

    /// Variable names in declaration order.
    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// Distribution means in declaration order.
    pub fn base_values(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.distribution.mean()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn normal(mean: f64, std_dev: f64) -> Distribution {
        Distribution::Normal { mean, std_dev }
    }

    #[test]
    fn test_distribution_validation() {
        assert!(normal(0.0, -1.0).validate("x").is_err());
        assert!(Distribution::Uniform { low: 2.0, high: 1.0 }
            .validate("x")
            .is_err());
        assert!(Distribution::Triangular {
            low: 0.0,
            mode: 5.0,
            high: 4.0
        }
        .validate("x")
        .is_err());
        assert!(Distribution::Triangular {
            low: 0.0,
            mode: 0.0,
            high: 4.0
        }
        .validate("x")
        .is_ok());
    }

    #[test]
    fn test_copula_mapping_at_median() {
        let tri = Distribution::Triangular {
            low: 0.0,
            mode: 0.5,
            high: 1.0,
        };
        assert_relative_eq!(tri.from_standard_normal(0.0), 0.5, epsilon = 1e-6);

        let uni = Distribution::Uniform {
            low: 10.0,
            high: 20.0,
        };
        assert_relative_eq!(uni.from_standard_normal(0.0), 15.0, epsilon = 1e-5);
        assert_relative_eq!(normal(3.0, 2.0).from_standard_normal(1.5), 6.0);
    }

    #[test]
    fn test_triangular_quantile_endpoints() {
        let tri = Distribution::Triangular {
            low: 1.0,
            mode: 2.0,
            high: 6.0,
        };
        assert_relative_eq!(tri.quantile_bounded(0.0), 1.0);
        assert_relative_eq!(tri.quantile_bounded(1.0), 6.0);
        // CDF at the mode is (mode - low) / (high - low)
        assert_relative_eq!(tri.quantile_bounded(0.2), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_iteration_bounds() {
        let vars = vec![Variable::new("a", normal(0.0, 1.0))];
        assert!(ScenarioDefinition::new("s", vars.clone(), 0).is_err());
        assert!(ScenarioDefinition::new("s", vars.clone(), MAX_ITERATIONS + 1).is_err());
        assert!(ScenarioDefinition::new("s", vars, MAX_ITERATIONS).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let vars = vec![
            Variable::new("a", normal(0.0, 1.0)),
            Variable::new("a", normal(1.0, 1.0)),
        ];
        let err = ScenarioDefinition::new("s", vars, 10).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_correlation_dimension_mismatch() {
        let vars = vec![Variable::new("a", normal(0.0, 1.0))];
        let scenario = ScenarioDefinition::new("s", vars, 10).unwrap();
        let err = scenario
            .with_correlation(CorrelationMatrix::identity(2))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_base_values_are_means() {
        let vars = vec![
            Variable::new("a", normal(4.0, 1.0)),
            Variable::new("b", Distribution::Uniform { low: 0.0, high: 2.0 }),
        ];
        let scenario = ScenarioDefinition::new("s", vars, 10).unwrap();
        assert_eq!(scenario.base_values(), vec![4.0, 1.0]);
        assert_eq!(scenario.variable_names(), vec!["a", "b"]);
    }
}
