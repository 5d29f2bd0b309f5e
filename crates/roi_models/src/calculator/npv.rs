//! Net present value.

use roi_core::types::{CashFlowSeries, EngineError};

/// Net present value `Σ cf_t / (1 + r)^t` with `t` starting at 0.
///
/// The initial outlay is the negative entry at `t = 0`. An empty series
/// cannot be constructed, so only the rate is checked here.
///
/// # Errors
///
/// [`EngineError::InvalidInput`] if `rate <= -1` or is not finite.
///
/// # Examples
/// ```
/// use roi_core::types::CashFlowSeries;
/// use roi_models::calculator::npv;
///
/// let flows = CashFlowSeries::new(vec![-1000.0, 1100.0]).unwrap();
/// assert!(npv(&flows, 0.10).unwrap().abs() < 1e-9);
/// assert!(npv(&flows, -1.0).is_err());
/// ```
pub fn npv(cash_flows: &CashFlowSeries, rate: f64) -> Result<f64, EngineError> {
    check_rate("discount_rate", rate)?;
    Ok(npv_unchecked(cash_flows.values(), rate))
}

/// `d NPV / d r`, used by the IRR Newton pass.
pub(crate) fn npv_derivative(values: &[f64], rate: f64) -> f64 {
    let base = 1.0 + rate;
    let mut discount = 1.0 / base;
    let mut sum = 0.0;
    for (t, cf) in values.iter().enumerate().skip(1) {
        discount /= base;
        sum -= t as f64 * cf * discount;
    }
    sum
}

/// NPV over raw values. The caller guarantees `rate > -1`.
pub(crate) fn npv_unchecked(values: &[f64], rate: f64) -> f64 {
    let base = 1.0 + rate;
    let mut discount = 1.0;
    let mut sum = 0.0;
    for cf in values {
        sum += cf * discount;
        discount /= base;
    }
    sum
}

pub(crate) fn check_rate(parameter: &str, rate: f64) -> Result<(), EngineError> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(EngineError::invalid(
            parameter,
            format!("must be finite and greater than -1, got {rate}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_textbook_npv() {
        let flows =
            CashFlowSeries::new(vec![-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0]).unwrap();
        // 300 * (1 - 1.1^-5) / 0.1 - 1000 = 137.236...
        assert_abs_diff_eq!(npv(&flows, 0.10).unwrap(), 137.24, epsilon = 0.01);
    }

    #[test]
    fn test_single_period_is_undiscounted() {
        let flows = CashFlowSeries::new(vec![-250.0]).unwrap();
        assert_eq!(npv(&flows, 0.3).unwrap(), -250.0);
    }

    #[test]
    fn test_rejects_rate_at_or_below_minus_one() {
        let flows = CashFlowSeries::new(vec![-1.0, 2.0]).unwrap();
        assert!(matches!(
            npv(&flows, -1.0),
            Err(EngineError::InvalidInput { .. })
        ));
        assert!(npv(&flows, -3.0).is_err());
        assert!(npv(&flows, f64::NAN).is_err());
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let values = [-1000.0, 400.0, 500.0, 300.0];
        let h = 1e-6;
        let fd = (npv_unchecked(&values, 0.08 + h) - npv_unchecked(&values, 0.08 - h)) / (2.0 * h);
        assert_abs_diff_eq!(npv_derivative(&values, 0.08), fd, epsilon = 1e-3);
    }

    proptest! {
        #[test]
        fn prop_zero_rate_npv_is_sum(values in prop::collection::vec(-1e6f64..1e6, 1..60)) {
            let flows = CashFlowSeries::new(values.clone()).unwrap();
            let total: f64 = values.iter().sum();
            prop_assert!((npv(&flows, 0.0).unwrap() - total).abs() <= 1e-6);
        }
    }
}
