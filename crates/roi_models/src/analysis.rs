//! Investment analysis: parameters to projected cash flows to metrics.
//!
//! Periods are months. Annual figures are spread evenly over the twelve
//! months of each year, operating costs escalate once per year, and the
//! annual discount rate `r` becomes the monthly rate `(1 + r)^(1/12) - 1`.

use roi_core::types::{CashFlowSeries, EngineError};
use serde::{Deserialize, Serialize};

use crate::calculator::{npv, payback_from_flows, tco, FinancialCalculator, RiskLevel};
use crate::industry::IndustryProfile;
use crate::investment::InvestmentParameters;

/// Headline metrics for one investment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvestmentMetrics {
    /// Net present value of the monthly flows
    pub npv: f64,
    /// Annualised IRR; `None` when the IRR is undefined
    pub irr_annualised: Option<f64>,
    /// Total cost of ownership over the timeline; a final partial year is
    /// prorated by month, matching the projected flows
    pub tco: f64,
    /// Undiscounted payback in months; `None` if not recovered
    pub payback_months: Option<f64>,
    /// Discounted payback in months; `None` if not recovered
    pub discounted_payback_months: Option<f64>,
    /// Risk band derived from the industry premium
    pub risk_level: RiskLevel,
    /// Annual expected return adjusted for `risk_level`
    pub risk_adjusted_return: f64,
    /// Net undiscounted gain over the investment
    pub roi: f64,
    /// Size-adjusted productivity benefit per year
    pub annual_benefit: f64,
}

/// Annual rate to the equivalent monthly rate.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Monthly cash flows: `-initial_investment` at month 0, then
/// `benefit - costs` for each month of the timeline.
///
/// ```
/// use roi_models::analysis::project_cash_flows;
/// use roi_models::industry::{CompanySize, Industry, IndustryRegistry};
/// use roi_models::investment::InvestmentParameters;
///
/// let params = InvestmentParameters::builder()
///     .annual_revenue(1_200_000.0)
///     .initial_investment(100_000.0)
///     .timeline_periods(24)
///     .build()
///     .unwrap();
/// let profile = IndustryRegistry::builtin().profile(Industry::Generic, CompanySize::Medium);
///
/// let flows = project_cash_flows(&params, &profile).unwrap();
/// assert_eq!(flows.len(), 25);
/// assert_eq!(flows.values()[0], -100_000.0);
/// ```
pub fn project_cash_flows(
    params: &InvestmentParameters,
    profile: &IndustryProfile,
) -> Result<CashFlowSeries, EngineError> {
    params.validate()?;

    let monthly_benefit = params.annual_revenue() * profile.productivity_gain_rate / 12.0;
    let growth = 1.0 + params.cost_escalation_rate();

    let periods = params.timeline_periods() as usize;
    let mut values = Vec::with_capacity(periods + 1);
    values.push(-params.initial_investment());

    let mut monthly_cost = params.annual_costs() / 12.0;
    for month in 1..=periods {
        if month > 1 && (month - 1) % 12 == 0 {
            monthly_cost *= growth;
        }
        values.push(monthly_benefit - monthly_cost);
    }
    CashFlowSeries::new(values)
}

/// Full metric bundle for `params` under `profile`.
///
/// Undefined IRR and missing payback are reported as `None`, not errors:
/// both are expected business outcomes for weak investments.
///
/// # Errors
///
/// [`EngineError::InvalidInput`] for invalid parameters or rates.
pub fn analyze_investment(
    params: &InvestmentParameters,
    profile: &IndustryProfile,
    calculator: &FinancialCalculator,
    risk_free_rate: f64,
) -> Result<InvestmentMetrics, EngineError> {
    let flows = project_cash_flows(params, profile)?;
    let rate = monthly_rate(params.discount_rate());

    let npv = npv(&flows, rate)?;

    let irr_annualised = match calculator.irr(&flows) {
        Ok(monthly) => Some((1.0 + monthly).powi(12) - 1.0),
        Err(EngineError::Convergence { .. }) => None,
        Err(other) => return Err(other),
    };

    let tco = timeline_tco(params)?;

    let payback_months = optional_payback(payback_from_flows(&flows, None))?;
    let discounted_payback_months = optional_payback(payback_from_flows(&flows, Some(rate)))?;

    let roi = flows.total() / params.initial_investment();
    let years = f64::from(params.timeline_periods()) / 12.0;
    let expected_return = match irr_annualised {
        Some(irr) => irr,
        None if roi > -1.0 => (1.0 + roi).powf(1.0 / years) - 1.0,
        None => -1.0,
    };

    let risk_level = RiskLevel::from_risk_premium(profile.risk_premium);
    let risk_adjusted_return =
        calculator.risk_adjusted_return(expected_return, risk_level, risk_free_rate)?;

    Ok(InvestmentMetrics {
        npv,
        irr_annualised,
        tco,
        payback_months,
        discounted_payback_months,
        risk_level,
        risk_adjusted_return,
        roi,
        annual_benefit: params.annual_revenue() * profile.productivity_gain_rate,
    })
}

/// TCO over whole years plus the months of a trailing partial year at that
/// year's escalated cost.
fn timeline_tco(params: &InvestmentParameters) -> Result<f64, EngineError> {
    let full_years = params.timeline_periods() / 12;
    let trailing_months = params.timeline_periods() % 12;
    let whole = tco(
        params.initial_investment(),
        params.annual_costs(),
        params.cost_escalation_rate(),
        full_years,
    )?;
    let trailing_cost = params.annual_costs()
        * (1.0 + params.cost_escalation_rate()).powi(full_years as i32)
        * f64::from(trailing_months)
        / 12.0;
    Ok(whole + trailing_cost)
}

fn optional_payback(result: Result<f64, EngineError>) -> Result<Option<f64>, EngineError> {
    match result {
        Ok(months) => Ok(Some(months)),
        Err(err) if err.is_no_payback() => Ok(None),
        Err(err) => Err(err),
    }
}
