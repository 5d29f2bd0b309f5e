//! Total cost of ownership and break-even volume.

use roi_core::types::EngineError;

/// Total cost of ownership over `years`:
/// `initial_cost + Σ_{y=1..years} annual_costs · (1 + maintenance_rate)^(y-1)`.
///
/// # Errors
///
/// [`EngineError::InvalidInput`] for negative or non-finite costs, or a
/// `maintenance_rate <= -1`.
///
/// ```
/// use roi_models::calculator::tco;
///
/// // 1000 + 100 + 110 + 121
/// assert!((tco(1000.0, 100.0, 0.10, 3).unwrap() - 1331.0).abs() < 1e-9);
/// assert_eq!(tco(500.0, 80.0, 0.0, 0).unwrap(), 500.0);
/// ```
pub fn tco(
    initial_cost: f64,
    annual_costs: f64,
    maintenance_rate: f64,
    years: u32,
) -> Result<f64, EngineError> {
    if !(initial_cost.is_finite() && initial_cost >= 0.0) {
        return Err(EngineError::invalid(
            "initial_cost",
            format!("must be non-negative, got {initial_cost}"),
        ));
    }
    if !(annual_costs.is_finite() && annual_costs >= 0.0) {
        return Err(EngineError::invalid(
            "annual_costs",
            format!("must be non-negative, got {annual_costs}"),
        ));
    }
    if !maintenance_rate.is_finite() || maintenance_rate <= -1.0 {
        return Err(EngineError::invalid(
            "maintenance_rate",
            format!("must be greater than -1, got {maintenance_rate}"),
        ));
    }

    let growth = 1.0 + maintenance_rate;
    let mut yearly = annual_costs;
    let mut total = initial_cost;
    for _ in 0..years {
        total += yearly;
        yearly *= growth;
    }
    Ok(total)
}

/// Units that must be sold to cover fixed costs:
/// `fixed_costs / (price_per_unit - variable_cost_per_unit)`.
///
/// # Errors
///
/// [`EngineError::InvalidInput`] when `price_per_unit <= variable_cost_per_unit`
/// (no break-even exists), when fixed costs are negative, or when any input
/// is not finite.
///
/// ```
/// use roi_models::calculator::break_even;
///
/// assert_eq!(break_even(10_000.0, 15.0, 25.0).unwrap(), 1000.0);
/// assert!(break_even(10_000.0, 25.0, 25.0).is_err());
/// ```
pub fn break_even(
    fixed_costs: f64,
    variable_cost_per_unit: f64,
    price_per_unit: f64,
) -> Result<f64, EngineError> {
    if ![fixed_costs, variable_cost_per_unit, price_per_unit]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(EngineError::invalid("break_even", "inputs must be finite"));
    }
    if fixed_costs < 0.0 {
        return Err(EngineError::invalid(
            "fixed_costs",
            format!("must be non-negative, got {fixed_costs}"),
        ));
    }
    if price_per_unit <= variable_cost_per_unit {
        return Err(EngineError::invalid(
            "price_per_unit",
            format!(
                "price {price_per_unit} must exceed variable cost {variable_cost_per_unit}; no break-even exists"
            ),
        ));
    }
    Ok(fixed_costs / (price_per_unit - variable_cost_per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_tco_without_escalation() {
        assert_relative_eq!(tco(2_000.0, 500.0, 0.0, 4).unwrap(), 4_000.0);
    }

    #[test]
    fn test_tco_rejects_bad_inputs() {
        assert!(tco(-1.0, 0.0, 0.0, 1).is_err());
        assert!(tco(0.0, -1.0, 0.0, 1).is_err());
        assert!(tco(0.0, 1.0, -1.0, 1).is_err());
    }

    #[test]
    fn test_break_even_rejects_negative_fixed_costs() {
        assert!(break_even(-1.0, 1.0, 2.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_break_even_fails_without_margin(
            fixed in 0.0f64..1e6,
            price in -1e3f64..1e3,
            gap in 0.0f64..1e3,
        ) {
            let variable = price + gap;
            let result = break_even(fixed, variable, price);
            prop_assert!(
                matches!(result, Err(EngineError::InvalidInput { .. })),
                "expected InvalidInput, got {:?}",
                result
            );
        }

        #[test]
        fn prop_break_even_covers_fixed_costs(
            fixed in 0.0f64..1e6,
            variable in 0.0f64..1e3,
            margin in 0.01f64..1e3,
        ) {
            let units = break_even(fixed, variable, variable + margin).unwrap();
            let contribution = units * ((variable + margin) - variable);
            prop_assert!((contribution - fixed).abs() <= 1e-6 * fixed.max(1.0));
        }
    }
}
