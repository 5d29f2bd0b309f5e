//! Investment parameters.
//!
//! Use [`InvestmentParameters::builder`] to construct validated instances.

use roi_core::types::EngineError;
use serde::{Deserialize, Serialize};

use crate::industry::{CompanySize, Industry};

/// Longest supported timeline, in monthly periods.
pub const MAX_TIMELINE_PERIODS: u32 = 120;

/// Validated inputs describing one investment.
///
/// Timeline periods are months. Rates are annual fractions.
///
/// # Examples
///
/// ```rust
/// use roi_models::industry::Industry;
/// use roi_models::investment::InvestmentParameters;
///
/// let params = InvestmentParameters::builder()
///     .annual_revenue(5_000_000.0)
///     .initial_investment(250_000.0)
///     .annual_costs(40_000.0)
///     .discount_rate(0.08)
///     .timeline_periods(36)
///     .industry(Industry::Manufacturing)
///     .build()
///     .expect("valid parameters");
///
/// assert_eq!(params.timeline_periods(), 36);
/// assert!(InvestmentParameters::builder().initial_investment(-1.0).timeline_periods(12).build().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InvestmentParametersBuilder")]
pub struct InvestmentParameters {
    annual_revenue: f64,
    initial_investment: f64,
    annual_costs: f64,
    cost_escalation_rate: f64,
    discount_rate: f64,
    timeline_periods: u32,
    industry: Industry,
    company_size: CompanySize,
}

impl InvestmentParameters {
    /// Creates a new builder.
    #[inline]
    pub fn builder() -> InvestmentParametersBuilder {
        InvestmentParametersBuilder::default()
    }

    /// Annual revenue of the business unit affected.
    #[inline]
    pub fn annual_revenue(&self) -> f64 {
        self.annual_revenue
    }

    /// Up-front investment, strictly positive.
    #[inline]
    pub fn initial_investment(&self) -> f64 {
        self.initial_investment
    }

    /// Annual operating and maintenance costs.
    #[inline]
    pub fn annual_costs(&self) -> f64 {
        self.annual_costs
    }

    /// Yearly growth rate of operating costs.
    #[inline]
    pub fn cost_escalation_rate(&self) -> f64 {
        self.cost_escalation_rate
    }

    /// Annual discount rate, `> -1`.
    #[inline]
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    /// Number of monthly periods, in `1..=120`.
    #[inline]
    pub fn timeline_periods(&self) -> u32 {
        self.timeline_periods
    }

    /// Timeline in whole years, rounded up.
    #[inline]
    pub fn timeline_years(&self) -> u32 {
        self.timeline_periods.div_ceil(12)
    }

    /// Industry tag.
    #[inline]
    pub fn industry(&self) -> Industry {
        self.industry
    }

    /// Company-size tag.
    #[inline]
    pub fn company_size(&self) -> CompanySize {
        self.company_size
    }

    /// Check the business invariants.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let finite = [
            ("annual_revenue", self.annual_revenue),
            ("initial_investment", self.initial_investment),
            ("annual_costs", self.annual_costs),
            ("cost_escalation_rate", self.cost_escalation_rate),
            ("discount_rate", self.discount_rate),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::invalid(*name, "must be finite"));
        }
        if self.initial_investment <= 0.0 {
            return Err(EngineError::invalid(
                "initial_investment",
                format!("must be positive, got {}", self.initial_investment),
            ));
        }
        if self.annual_revenue < 0.0 {
            return Err(EngineError::invalid("annual_revenue", "must be non-negative"));
        }
        if self.annual_costs < 0.0 {
            return Err(EngineError::invalid("annual_costs", "must be non-negative"));
        }
        if self.cost_escalation_rate <= -1.0 {
            return Err(EngineError::invalid(
                "cost_escalation_rate",
                "must be greater than -1",
            ));
        }
        if self.discount_rate <= -1.0 {
            return Err(EngineError::invalid(
                "discount_rate",
                format!("must be greater than -1, got {}", self.discount_rate),
            ));
        }
        if self.timeline_periods == 0 || self.timeline_periods > MAX_TIMELINE_PERIODS {
            return Err(EngineError::invalid(
                "timeline_periods",
                format!(
                    "must be in 1..={MAX_TIMELINE_PERIODS}, got {}",
                    self.timeline_periods
                ),
            ));
        }
        Ok(())
    }
}

/// Builder for [`InvestmentParameters`].
///
/// `initial_investment` and `timeline_periods` are required. Defaults:
/// revenue and costs 0, escalation 0, discount rate 0.10, industry
/// `Generic`, company size `Medium`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvestmentParametersBuilder {
    #[serde(default)]
    annual_revenue: Option<f64>,
    #[serde(default)]
    initial_investment: Option<f64>,
    #[serde(default)]
    annual_costs: Option<f64>,
    #[serde(default)]
    cost_escalation_rate: Option<f64>,
    #[serde(default)]
    discount_rate: Option<f64>,
    #[serde(default)]
    timeline_periods: Option<u32>,
    #[serde(default)]
    industry: Option<Industry>,
    #[serde(default)]
    company_size: Option<CompanySize>,
}

impl InvestmentParametersBuilder {
    /// Sets annual revenue.
    #[inline]
    pub fn annual_revenue(mut self, value: f64) -> Self {
        self.annual_revenue = Some(value);
        self
    }

    /// Sets the up-front investment.
    #[inline]
    pub fn initial_investment(mut self, value: f64) -> Self {
        self.initial_investment = Some(value);
        self
    }

    /// Sets annual operating costs.
    #[inline]
    pub fn annual_costs(mut self, value: f64) -> Self {
        self.annual_costs = Some(value);
        self
    }

    /// Sets the yearly cost escalation rate.
    #[inline]
    pub fn cost_escalation_rate(mut self, value: f64) -> Self {
        self.cost_escalation_rate = Some(value);
        self
    }

    /// Sets the annual discount rate.
    #[inline]
    pub fn discount_rate(mut self, value: f64) -> Self {
        self.discount_rate = Some(value);
        self
    }

    /// Sets the timeline in monthly periods.
    #[inline]
    pub fn timeline_periods(mut self, value: u32) -> Self {
        self.timeline_periods = Some(value);
        self
    }

    /// Sets the industry.
    #[inline]
    pub fn industry(mut self, value: Industry) -> Self {
        self.industry = Some(value);
        self
    }

    /// Sets the company size.
    #[inline]
    pub fn company_size(mut self, value: CompanySize) -> Self {
        self.company_size = Some(value);
        self
    }

    /// Builds and validates the parameters.
    pub fn build(self) -> Result<InvestmentParameters, EngineError> {
        let initial_investment = self
            .initial_investment
            .ok_or_else(|| EngineError::invalid("initial_investment", "must be specified"))?;
        let timeline_periods = self
            .timeline_periods
            .ok_or_else(|| EngineError::invalid("timeline_periods", "must be specified"))?;

        let params = InvestmentParameters {
            annual_revenue: self.annual_revenue.unwrap_or(0.0),
            initial_investment,
            annual_costs: self.annual_costs.unwrap_or(0.0),
            cost_escalation_rate: self.cost_escalation_rate.unwrap_or(0.0),
            discount_rate: self.discount_rate.unwrap_or(0.10),
            timeline_periods,
            industry: self.industry.unwrap_or(Industry::Generic),
            company_size: self.company_size.unwrap_or_default(),
        };
        params.validate()?;
        Ok(params)
    }
}

impl TryFrom<InvestmentParametersBuilder> for InvestmentParameters {
    type Error = EngineError;

    fn try_from(builder: InvestmentParametersBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
