//! Newton-Raphson root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Newton-Raphson root finder.
///
/// Uses Newton's method: `x_{n+1} = x_n - f(x_n) / f'(x_n)` for fast
/// quadratic convergence on smooth functions.
///
/// # Convergence
///
/// The number of correct digits roughly doubles each iteration near a
/// root. It may fail if:
/// - The derivative is near zero
/// - The initial guess is far from the root
/// - The function has discontinuities
///
/// Callers that need a guaranteed answer pair it with
/// [`BisectionSolver`](super::BisectionSolver).
///
/// # Example
///
/// ```
/// use roi_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
///
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
///
/// let f = |x: f64| x * x - 2.0;
/// let f_prime = |x: f64| 2.0 * x;
///
/// let root = solver.find_root(f, f_prime, 1.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> NewtonRaphsonSolver<T> {
    /// Create a new Newton-Raphson solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Find a root of `f` using explicit derivative `f_prime`.
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root where `|f(x)| < tolerance` or the last step was
    ///   below tolerance
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    /// * `Err(SolverError::DerivativeNearZero)` - Derivative too small
    /// * `Err(SolverError::NumericalInstability)` - Iterate became non-finite
    pub fn find_root<F, G>(&self, f: F, f_prime: G, x0: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        self.iterate(f, f_prime, x0, None)
    }

    /// Like [`find_root`](Self::find_root) but fails as soon as an iterate
    /// leaves `[lower, upper]`.
    ///
    /// Used when the caller already holds a bracket and wants the root
    /// inside it, not whichever root Newton's method wanders to.
    pub fn find_root_within<F, G>(
        &self,
        f: F,
        f_prime: G,
        x0: T,
        lower: T,
        upper: T,
    ) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        self.iterate(f, f_prime, x0, Some((lower, upper)))
    }

    fn iterate<F, G>(&self, f: F, f_prime: G, x0: T, bounds: Option<(T, T)>) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        let tolerance = self.config.tolerance;
        let epsilon = T::from(1e-30).unwrap_or_else(T::min_positive_value);
        let mut x = x0;

        for _iteration in 0..self.config.max_iterations {
            let f_val = f(x);
            if f_val.abs() < tolerance {
                return Ok(x);
            }

            let f_prime_val = f_prime(x);
            if f_prime_val.abs() < epsilon {
                return Err(SolverError::DerivativeNearZero {
                    x: x.to_f64().unwrap_or(f64::NAN),
                });
            }

            let step = f_val / f_prime_val;
            x = x - step;

            if !x.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Newton iteration produced non-finite value".to_string(),
                ));
            }
            if let Some((lower, upper)) = bounds {
                if x < lower || x > upper {
                    return Err(SolverError::NumericalInstability(format!(
                        "Newton iterate {} left the bracket",
                        x.to_f64().unwrap_or(f64::NAN)
                    )));
                }
            }
            if step.abs() < tolerance * (T::one() + x.abs()) {
                return Ok(x);
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sqrt_two() {
        let solver = NewtonRaphsonSolver::with_defaults();
        let root = solver
            .find_root(|x: f64| x * x - 2.0, |x: f64| 2.0 * x, 1.0)
            .unwrap();
        assert_relative_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_derivative_near_zero() {
        let solver = NewtonRaphsonSolver::with_defaults();
        let result = solver.find_root(|x: f64| x * x + 1.0, |x: f64| 2.0 * x, 0.0);
        assert!(matches!(result, Err(SolverError::DerivativeNearZero { .. })));
    }

    #[test]
    fn test_max_iterations() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-10, 3));
        // x^2 + 1 has no real root; iterates oscillate
        let result = solver.find_root(|x: f64| x * x + 1.0, |x: f64| 2.0 * x, 0.5);
        assert!(result.is_err());
    }

    #[test]
    fn test_within_rejects_escape() {
        let solver = NewtonRaphsonSolver::with_defaults();
        // Root at 3.0 lies outside [0, 1]
        let result = solver.find_root_within(|x: f64| x - 3.0, |_| 1.0, 0.5, 0.0, 1.0);
        assert!(matches!(result, Err(SolverError::NumericalInstability(_))));
    }

    #[test]
    fn test_within_accepts_inside() {
        let solver = NewtonRaphsonSolver::with_defaults();
        let root = solver
            .find_root_within(|x: f64| x * x - 0.25, |x: f64| 2.0 * x, 0.9, 0.0, 1.0)
            .unwrap();
        assert_relative_eq!(root, 0.5, epsilon = 1e-10);
    }
}
