//! Bisection root-finding solver and bracket scanning.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Bisection root finder.
///
/// Halves a sign-change bracket until `|f(mid)| < tolerance` or the
/// half-width drops below tolerance. Slow but guaranteed to converge for
/// continuous functions with a valid bracket.
///
/// # Example
///
/// ```
/// use roi_core::math::solvers::{BisectionSolver, SolverConfig};
///
/// let solver = BisectionSolver::new(SolverConfig::default());
/// let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BisectionSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BisectionSolver<T> {
    /// Create a new bisection solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Find a root of `f` in the bracket `[a, b]`.
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root
    /// * `Err(SolverError::NoBracket)` - `f(a)` and `f(b)` have same sign
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let (mut lo, mut hi) = if a <= b { (a, b) } else { (b, a) };
        let mut f_lo = f(lo);
        let f_hi = f(hi);

        if f_lo == T::zero() {
            return Ok(lo);
        }
        if f_hi == T::zero() {
            return Ok(hi);
        }
        if f_lo * f_hi > T::zero() {
            return Err(SolverError::NoBracket {
                a: lo.to_f64().unwrap_or(f64::NAN),
                b: hi.to_f64().unwrap_or(f64::NAN),
            });
        }

        let two = T::one() + T::one();
        for _iteration in 0..self.config.max_iterations {
            let mid = lo + (hi - lo) / two;
            let f_mid = f(mid);

            if f_mid.abs() < self.config.tolerance || (hi - lo) / two < self.config.tolerance {
                return Ok(mid);
            }

            if f_lo * f_mid < T::zero() {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
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

/// Scan `[lower, upper]` on a uniform grid of `steps` cells and return the
/// first (left-most) sub-interval across which `f` changes sign.
///
/// Returns `None` when no sign change is found. A grid point where `f` is
/// exactly zero is returned as a degenerate bracket `(x, x)`.
///
/// ```
/// use roi_core::math::solvers::scan_for_bracket;
///
/// // Roots at 1 and 3; the scan finds the left one.
/// let f = |x: f64| (x - 1.0) * (x - 3.0);
/// let (a, b) = scan_for_bracket(f, 0.0, 5.0, 7).unwrap();
/// assert!(a < 1.0 && 1.0 < b);
/// ```
pub fn scan_for_bracket<T, F>(f: F, lower: T, upper: T, steps: usize) -> Option<(T, T)>
where
    T: Float,
    F: Fn(T) -> T,
{
    if steps == 0 || lower.partial_cmp(&upper) != Some(std::cmp::Ordering::Less) {
        return None;
    }
    let n = T::from(steps)?;
    let width = (upper - lower) / n;

    let mut a = lower;
    let mut fa = f(a);
    if fa == T::zero() {
        return Some((a, a));
    }
    for i in 1..=steps {
        let b = if i == steps {
            upper
        } else {
            lower + width * T::from(i)?
        };
        let fb = f(b);
        if fb == T::zero() {
            return Some((b, b));
        }
        if fa.is_finite() && fb.is_finite() && fa * fb < T::zero() {
            return Some((a, b));
        }
        a = b;
        fa = fb;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cubic() {
        let solver = BisectionSolver::with_defaults();
        let f = |x: f64| x * x * x - x - 2.0;
        let root = solver.find_root(f, 1.0, 2.0).unwrap();
        assert_abs_diff_eq!(f(root), 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_reversed_bracket() {
        let solver = BisectionSolver::with_defaults();
        let root = solver.find_root(|x: f64| x - 0.3, 1.0, 0.0).unwrap();
        assert_abs_diff_eq!(root, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_no_bracket() {
        let solver = BisectionSolver::with_defaults();
        let result = solver.find_root(|x: f64| x * x + 1.0, -1.0, 1.0);
        assert!(matches!(result, Err(SolverError::NoBracket { .. })));
    }

    #[test]
    fn test_iteration_cap() {
        let solver = BisectionSolver::new(SolverConfig::new(1e-15, 5));
        let result = solver.find_root(|x: f64| x - 0.123_456_789, 0.0, 1.0);
        assert_eq!(
            result,
            Err(SolverError::MaxIterationsExceeded { iterations: 5 })
        );
    }

    #[test]
    fn test_scan_finds_leftmost_sign_change() {
        let f = |x: f64| (x - 0.5) * (x - 2.5);
        let (a, b) = scan_for_bracket(f, -0.99, 10.0, 1000).unwrap();
        assert!(a <= 0.5 && 0.5 <= b);
        assert!(b - a < 0.02);
    }

    #[test]
    fn test_scan_without_sign_change() {
        assert!(scan_for_bracket(|x: f64| x * x + 1.0, -1.0, 1.0, 100).is_none());
    }

    #[test]
    fn test_scan_degenerate_range() {
        assert!(scan_for_bracket(|x: f64| x, 1.0, 1.0, 10).is_none());
    }
}
