//! Internal rate of return.

use roi_core::config::SolverSettings;
use roi_core::math::solvers::{scan_for_bracket, BisectionSolver, NewtonRaphsonSolver};
use roi_core::types::{CashFlowSeries, EngineError};

use super::npv::{npv_derivative, npv_unchecked};

/// Internal rate of return with the default bracket `[-0.99, 10.0]`.
///
/// See [`irr_with`].
///
/// # Examples
/// ```
/// use roi_core::types::CashFlowSeries;
/// use roi_models::calculator::irr;
///
/// let flows = CashFlowSeries::new(vec![-1000.0, 1100.0]).unwrap();
/// assert!((irr(&flows).unwrap() - 0.10).abs() < 1e-6);
/// ```
pub fn irr(cash_flows: &CashFlowSeries) -> Result<f64, EngineError> {
    irr_with(cash_flows, &SolverSettings::default())
}

/// Smallest rate in `[settings.lower, settings.upper]` at which NPV is zero.
///
/// 1. Scan the bracket on `scan_steps` cells for the left-most sign change.
/// 2. Run Newton-Raphson from the midpoint of that cell; accept the root
///    only if every iterate stays inside the cell.
/// 3. Otherwise bisect the cell.
///
/// # Errors
///
/// [`EngineError::Convergence`] when the bracket holds no sign change
/// (IRR undefined) or both passes exhaust `max_iterations`. The engine
/// never guesses a rate.
pub fn irr_with(cash_flows: &CashFlowSeries, settings: &SolverSettings) -> Result<f64, EngineError> {
    let values = cash_flows.values();
    let f = |r: f64| npv_unchecked(values, r);

    let (a, b) = scan_for_bracket(f, settings.lower, settings.upper, settings.scan_steps)
        .ok_or_else(|| EngineError::Convergence {
            reason: format!(
                "NPV has no sign change on [{}, {}]; IRR is undefined",
                settings.lower, settings.upper
            ),
        })?;
    if a == b {
        return Ok(a);
    }

    let config = settings.solver_config();
    let newton = NewtonRaphsonSolver::new(config);
    let start = 0.5 * (a + b);
    if let Ok(root) = newton.find_root_within(f, |r| npv_derivative(values, r), start, a, b) {
        return Ok(root);
    }

    BisectionSolver::new(config)
        .find_root(f, a, b)
        .map_err(EngineError::from)
}
