//! Financial calculator.
//!
//! Pure functions: each returns a value or a specific [`EngineError`]
//! kind, never a clamped or substituted default.
//!
//! | Operation | Function |
//! |-----------|----------|
//! | Net present value | [`npv`] |
//! | Internal rate of return | [`irr`], [`irr_with`] |
//! | Total cost of ownership | [`tco`] |
//! | Payback period | [`payback_period`], [`payback_period_within`], [`payback_from_flows`] |
//! | Risk-adjusted return | [`risk_adjusted_return`], [`risk_adjusted_return_with`] |
//! | Break-even volume | [`break_even`] |
//!
//! [`FinancialCalculator`] bundles the configurable pieces (IRR bracket,
//! risk multipliers, payback horizon) so callers holding an
//! [`EngineConfig`] do not have to thread them through every call.
//!
//! [`EngineError`]: roi_core::types::EngineError

mod cost;
mod irr;
mod npv;
mod payback;
mod risk;

pub use cost::{break_even, tco};
pub use irr::{irr, irr_with};
pub use npv::npv;
pub use payback::{
    payback_from_flows, payback_period, payback_period_within, DEFAULT_PAYBACK_HORIZON,
};
pub use risk::{risk_adjusted_return, risk_adjusted_return_with, RiskLevel};

use roi_core::config::{EngineConfig, RiskPremiums, SolverSettings};
use roi_core::types::{CashFlowSeries, EngineError};

/// Calculator carrying configured solver settings and risk multipliers.
///
/// ```
/// use roi_core::config::EngineConfig;
/// use roi_core::types::CashFlowSeries;
/// use roi_models::calculator::{FinancialCalculator, RiskLevel};
///
/// let calc = FinancialCalculator::from_config(&EngineConfig::default());
/// let flows = CashFlowSeries::new(vec![-1000.0, 1100.0]).unwrap();
/// assert!((calc.irr(&flows).unwrap() - 0.10).abs() < 1e-6);
/// assert!((calc.risk_adjusted_return(0.10, RiskLevel::Low, 0.0).unwrap() - 0.05).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct FinancialCalculator {
    solver: SolverSettings,
    premiums: RiskPremiums,
    payback_horizon: u32,
}

impl Default for FinancialCalculator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl FinancialCalculator {
    /// Calculator using `config.solver` and `config.risk_premiums`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            solver: config.solver.clone(),
            premiums: config.risk_premiums.clone(),
            payback_horizon: DEFAULT_PAYBACK_HORIZON,
        }
    }

    /// Override the payback search horizon.
    pub fn with_payback_horizon(mut self, periods: u32) -> Self {
        self.payback_horizon = periods;
        self
    }

    /// Configured risk multipliers.
    pub fn premiums(&self) -> &RiskPremiums {
        &self.premiums
    }

    /// See [`npv`].
    pub fn npv(&self, cash_flows: &CashFlowSeries, rate: f64) -> Result<f64, EngineError> {
        npv(cash_flows, rate)
    }

    /// See [`irr_with`].
    pub fn irr(&self, cash_flows: &CashFlowSeries) -> Result<f64, EngineError> {
        irr_with(cash_flows, &self.solver)
    }

    /// See [`payback_period_within`].
    pub fn payback_period(
        &self,
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
            self.payback_horizon,
        )
    }

    /// See [`risk_adjusted_return_with`].
    pub fn risk_adjusted_return(
        &self,
        expected_return: f64,
        level: RiskLevel,
        risk_free_rate: f64,
    ) -> Result<f64, EngineError> {
        risk_adjusted_return_with(expected_return, level, risk_free_rate, &self.premiums)
    }
}
