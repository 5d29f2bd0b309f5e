//! Payback period.

use roi_core::types::{CashFlowSeries, EngineError};

use super::npv::check_rate;

/// Default number of periods searched before giving up.
pub const DEFAULT_PAYBACK_HORIZON: u32 = 120;

/// Periods needed for constant savings to recover an investment, searched
/// over [`DEFAULT_PAYBACK_HORIZON`] periods.
///
/// See [`payback_period_within`].
///
/// ```
/// use roi_models::calculator::payback_period;
///
/// assert_eq!(payback_period(1000.0, 250.0, false, 0.0).unwrap(), 4.0);
/// assert!(payback_period(1000.0, 250.0, true, 0.10).unwrap() > 4.0);
/// ```
pub fn payback_period(
    initial_investment: f64,
    periodic_savings: f64,
    discounted: bool,
    discount_rate: f64,
) -> Result<f64, EngineError> {
    payback_period_within(
        initial_investment,
        periodic_savings,
        discounted,
        discount_rate,
        DEFAULT_PAYBACK_HORIZON,
    )
}

/// Periods needed for constant savings to recover an investment.
///
/// - Undiscounted: `initial_investment / periodic_savings`.
/// - Discounted: accumulate `savings / (1 + r)^t` for `t = 1, 2, ...` until
///   the running total meets the investment, interpolating linearly inside
///   the crossing period.
///
/// `discount_rate` is ignored when `discounted` is `false`.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] for a non-positive investment, a zero
///   horizon, or (when discounting) a rate `<= -1`
/// - [`EngineError::NoPayback`] if the investment is not recovered within
///   `horizon` periods
pub fn payback_period_within(
    initial_investment: f64,
    periodic_savings: f64,
    discounted: bool,
    discount_rate: f64,
    horizon: u32,
) -> Result<f64, EngineError> {
    if !(initial_investment.is_finite() && initial_investment > 0.0) {
        return Err(EngineError::invalid(
            "initial_investment",
            format!("must be positive, got {initial_investment}"),
        ));
    }
    if !periodic_savings.is_finite() {
        return Err(EngineError::invalid("periodic_savings", "must be finite"));
    }
    if horizon == 0 {
        return Err(EngineError::invalid("horizon", "must be at least one period"));
    }

    if !discounted {
        let recovered = periodic_savings.max(0.0) * f64::from(horizon);
        if periodic_savings <= 0.0 || recovered < initial_investment {
            return Err(EngineError::NoPayback {
                horizon_periods: horizon,
                recovered,
            });
        }
        return Ok(initial_investment / periodic_savings);
    }

    check_rate("discount_rate", discount_rate)?;
    let base = 1.0 + discount_rate;
    let mut cumulative = 0.0;
    let mut discount = 1.0;
    for t in 1..=horizon {
        discount /= base;
        let pv = periodic_savings * discount;
        if pv > 0.0 && cumulative + pv >= initial_investment {
            let fraction = (initial_investment - cumulative) / pv;
            return Ok(f64::from(t - 1) + fraction);
        }
        cumulative += pv;
    }
    Err(EngineError::NoPayback {
        horizon_periods: horizon,
        recovered: cumulative,
    })
}

/// Periods until the cumulative cash position of an arbitrary series turns
/// non-negative, with optional per-period discounting.
///
/// Index 0 holds the (negative) outlay. The result is interpolated within
/// the crossing period; a series that is non-negative from the start pays
/// back at 0.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] if `rate_per_period <= -1`
/// - [`EngineError::NoPayback`] if the position is still negative at the
///   end of the series
pub fn payback_from_flows(
    cash_flows: &CashFlowSeries,
    rate_per_period: Option<f64>,
) -> Result<f64, EngineError> {
    let base = match rate_per_period {
        Some(rate) => {
            check_rate("discount_rate", rate)?;
            1.0 + rate
        }
        None => 1.0,
    };

    let values = cash_flows.values();
    let mut cumulative = values[0];
    if cumulative >= 0.0 {
        return Ok(0.0);
    }

    let mut discount = 1.0;
    for (t, cf) in values.iter().enumerate().skip(1) {
        discount /= base;
        let pv = cf * discount;
        if pv > 0.0 && cumulative + pv >= 0.0 {
            return Ok((t - 1) as f64 + (-cumulative) / pv);
        }
        cumulative += pv;
    }
    Err(EngineError::NoPayback {
        horizon_periods: u32::try_from(values.len() - 1).unwrap_or(u32::MAX),
        recovered: cumulative - values[0],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_payback() {
        assert_eq!(payback_period(1000.0, 250.0, false, 0.0).unwrap(), 4.0);
        assert_eq!(payback_period(1000.0, 400.0, false, 0.5).unwrap(), 2.5);
    }

    #[test]
    fn test_discounted_payback_interpolates() {
        // PV of savings at 10%: 90.909, 82.645, 75.131 -> cumulative 248.685
        let p = payback_period(200.0, 100.0, true, 0.10).unwrap();
        // 173.554 after two periods, remaining 26.446 of 75.131
        assert_abs_diff_eq!(p, 2.0 + 26.446_281 / 75.131_480, epsilon = 1e-6);
    }

    #[test]
    fn test_discounted_at_zero_rate_matches_simple() {
        assert_abs_diff_eq!(
            payback_period(1000.0, 300.0, true, 0.0).unwrap(),
            payback_period(1000.0, 300.0, false, 0.0).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_no_payback_for_non_positive_savings() {
        let err = payback_period(1000.0, 0.0, false, 0.0).unwrap_err();
        assert!(err.is_no_payback());
        assert!(payback_period(1000.0, -5.0, true, 0.05)
            .unwrap_err()
            .is_no_payback());
    }

    #[test]
    fn test_no_payback_beyond_horizon() {
        let err = payback_period_within(1000.0, 10.0, false, 0.0, 12).unwrap_err();
        assert_eq!(
            err,
            EngineError::NoPayback {
                horizon_periods: 12,
                recovered: 120.0
            }
        );
        // Discounted perpetuity 10 / 0.05 = 200 never reaches 1000.
        assert!(payback_period(1000.0, 10.0, true, 0.05)
            .unwrap_err()
            .is_no_payback());
    }

    #[test]
    fn test_invalid_investment() {
        assert!(matches!(
            payback_period(0.0, 10.0, false, 0.0),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_payback_from_flows() {
        let flows = CashFlowSeries::new(vec![-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0]).unwrap();
        assert_abs_diff_eq!(payback_from_flows(&flows, None).unwrap(), 3.0 + 100.0 / 300.0, epsilon = 1e-12);
        assert!(payback_from_flows(&flows, Some(0.10)).unwrap() > 3.0 + 1.0 / 3.0);

        let short = CashFlowSeries::new(vec![-1000.0, 300.0]).unwrap();
        let err = payback_from_flows(&short, None).unwrap_err();
        assert_eq!(
            err,
            EngineError::NoPayback {
                horizon_periods: 1,
                recovered: 300.0
            }
        );
    }
}
