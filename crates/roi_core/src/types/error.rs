//! Structured error types for the engine.
//!
//! The business-facing taxonomy lives in [`EngineError`]. Lower-level
//! failures ([`SolverError`], [`CorrelationError`]) are kept separate so the
//! numerical building blocks stay reusable, and convert into
//! [`EngineError`] at the calculator boundary.

use thiserror::Error;

/// Business-level engine failure.
///
/// Every calculator and scenario operation either returns a valid result or
/// one of these kinds. No operation clamps or substitutes a default for an
/// out-of-domain input.
///
/// # Examples
/// ```
/// use roi_core::types::EngineError;
///
/// let err = EngineError::invalid("discount_rate", "must be greater than -1");
/// assert!(err.to_string().contains("discount_rate"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Out-of-domain scalar input (negative investment, zero timeline, ...).
    #[error("Invalid input '{parameter}': {reason}")]
    InvalidInput {
        /// Name of the offending parameter
        parameter: String,
        /// Why the value was rejected
        reason: String,
    },

    /// An iterative root-find did not converge within its budget.
    #[error("Failed to converge: {reason}")]
    Convergence {
        /// Description of the failure
        reason: String,
    },

    /// Savings never recover the investment within the horizon.
    #[error("No payback within {horizon_periods} periods (recovered {recovered:.2})")]
    NoPayback {
        /// Number of periods examined
        horizon_periods: u32,
        /// Cumulative (possibly discounted) savings at the horizon
        recovered: f64,
    },

    /// A statistical operation received too few observations.
    #[error("Insufficient data: got {got}, need at least {need}")]
    InsufficientData {
        /// Observations supplied
        got: usize,
        /// Minimum observations required
        need: usize,
    },

    /// An outcome model produced NaN or infinite values.
    #[error("Outcome model produced {count} non-finite values")]
    NonFiniteOutcome {
        /// Number of non-finite evaluations
        count: usize,
    },
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidInput`].
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for the expected business outcome "no payback".
    pub fn is_no_payback(&self) -> bool {
        matches!(self, Self::NoPayback { .. })
    }
}

/// Root-finding solver errors.
///
/// # Variants
/// - `MaxIterationsExceeded`: Solver failed to converge within iteration limit
/// - `DerivativeNearZero`: Derivative too small for Newton-Raphson
/// - `NoBracket`: Function values at bracket endpoints have same sign
/// - `NumericalInstability`: General numerical instability
///
/// # Examples
/// ```
/// use roi_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Derivative near zero (division by zero risk in Newton-Raphson).
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The x value where derivative was near zero
        x: f64,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl From<SolverError> for EngineError {
    fn from(err: SolverError) -> Self {
        EngineError::Convergence {
            reason: err.to_string(),
        }
    }
}

/// Correlation matrix validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// Matrix is not positive definite.
    #[error("Correlation matrix is not positive definite")]
    NotPositiveDefinite,

    /// Matrix dimensions are invalid.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected number of elements (n * n)
        expected: usize,
        /// Number of elements supplied
        got: usize,
    },

    /// Diagonal element differs from 1.0.
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Row/column index
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Matrix is not symmetric.
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
    },

    /// Correlation value out of range [-1, 1].
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
        /// Offending value
        value: f64,
    },
}

impl From<CorrelationError> for EngineError {
    fn from(err: CorrelationError) -> Self {
        EngineError::invalid("correlation_matrix", err.to_string())
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(String),

    /// The configuration file is not valid TOML for the expected schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// One or more values are out of range.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = EngineError::invalid("initial_investment", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid input 'initial_investment': must be positive"
        );
    }

    #[test]
    fn test_no_payback_display() {
        let err = EngineError::NoPayback {
            horizon_periods: 120,
            recovered: 512.345,
        };
        assert!(err.to_string().contains("120 periods"));
        assert!(err.to_string().contains("512.35"));
        assert!(err.is_no_payback());
    }

    #[test]
    fn test_solver_error_converts_to_convergence() {
        let err: EngineError = SolverError::NoBracket { a: -0.99, b: 10.0 }.into();
        match err {
            EngineError::Convergence { reason } => assert!(reason.contains("No bracket")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_correlation_error_converts_to_invalid_input() {
        let err: EngineError = CorrelationError::NotSymmetric { i: 0, j: 1 }.into();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        assert!(!err.is_no_payback());
    }

    #[test]
    fn test_config_error_joins_messages() {
        let err = ConfigError::Invalid(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Invalid configuration: a; b");
    }
}
