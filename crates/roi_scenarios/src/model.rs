//! Outcome models evaluated once per Monte Carlo draw.
//!
//! A model turns one joint sample of the scenario variables into a single
//! number (NPV, annual saving, ...). Models must be `Sync`: parallel runs
//! share one instance across worker threads.
//!
//! [`OutcomeModel::model_id`] is part of every cache key built from a
//! model, so two models reporting the same id must compute the same
//! function.

use std::collections::BTreeMap;

use roi_core::types::EngineError;
use roi_models::analysis::{monthly_rate, project_cash_flows};
use roi_models::calculator::npv;
use roi_models::industry::IndustryProfile;
use roi_models::investment::InvestmentParameters;
use serde::{Deserialize, Serialize};

/// Borrowed view of one joint draw: variable names and their values.
#[derive(Clone, Copy, Debug)]
pub struct Sample<'a> {
    names: &'a [String],
    values: &'a [f64],
}

impl<'a> Sample<'a> {
    /// Pair names with values.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] if the slices differ in length.
    pub fn new(names: &'a [String], values: &'a [f64]) -> Result<Self, EngineError> {
        if names.len() != values.len() {
            return Err(EngineError::invalid(
                "sample",
                format!("{} names but {} values", names.len(), values.len()),
            ));
        }
        Ok(Self { names, values })
    }

    /// Pairing for callers that build both slices from the same scenario.
    #[inline]
    pub(crate) fn from_parts(names: &'a [String], values: &'a [f64]) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// Value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Value of `name`, or `default` when the scenario does not vary it.
    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    /// Values in variable order.
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Names in variable order.
    pub fn names(&self) -> &'a [String] {
        self.names
    }

    /// `(name, value)` pairs in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let values = self.values;
        self.names
            .iter()
            .zip(values.iter().copied())
            .map(|(n, v)| (n.as_str(), v))
    }
}

/// A deterministic function from a sample to an outcome.
pub trait OutcomeModel: Sync {
    /// Stable identifier used in cache keys.
    fn model_id(&self) -> &str;

    /// Outcome for one draw. Non-finite outcomes are reported by the caller
    /// as [`EngineError::NonFiniteOutcome`].
    fn evaluate(&self, sample: &Sample<'_>) -> f64;
}

/// Closure-backed model.
///
/// ```
/// use roi_scenarios::model::{FnModel, OutcomeModel, Sample};
///
/// let model = FnModel::new("double_x", |s: &Sample<'_>| 2.0 * s.get_or("x", 0.0));
/// let names = vec!["x".to_string()];
/// assert_eq!(model.evaluate(&Sample::new(&names, &[4.0]).unwrap()), 8.0);
/// ```
pub struct FnModel<F> {
    id: String,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&Sample<'_>) -> f64 + Sync,
{
    /// Wrap `f` under `id`.
    pub fn new(id: impl Into<String>, f: F) -> Self {
        Self { id: id.into(), f }
    }
}

impl<F> OutcomeModel for FnModel<F>
where
    F: Fn(&Sample<'_>) -> f64 + Sync,
{
    fn model_id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, sample: &Sample<'_>) -> f64 {
        (self.f)(sample)
    }
}

impl<F> std::fmt::Debug for FnModel<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModel").field("id", &self.id).finish()
    }
}

/// `intercept + Σ coefficient·variable`; variables without a coefficient
/// are ignored, coefficients without a variable contribute nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    id: String,
    /// Constant term
    pub intercept: f64,
    /// Per-variable weights
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearModel {
    /// Linear model whose id encodes its coefficients.
    pub fn new(intercept: f64, coefficients: BTreeMap<String, f64>) -> Self {
        let terms: Vec<String> = coefficients
            .iter()
            .map(|(name, c)| format!("{c:.10}*{name}"))
            .collect();
        let id = format!("linear({intercept:.10};{})", terms.join("+"));
        Self {
            id,
            intercept,
            coefficients,
        }
    }
}

impl OutcomeModel for LinearModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, sample: &Sample<'_>) -> f64 {
        sample.iter().fold(self.intercept, |acc, (name, value)| {
            acc + self.coefficients.get(name).copied().unwrap_or(0.0) * value
        })
    }
}

/// NPV of an investment with uncertain drivers.
///
/// Recognised variables override the corresponding parameter:
/// `annual_revenue`, `initial_investment`, `annual_costs`,
/// `cost_escalation_rate`, `discount_rate` and `productivity_gain_rate`.
/// Other variables are ignored. A draw that produces invalid parameters
/// (for example a negative investment) evaluates to NaN.
#[derive(Clone, Debug)]
pub struct InvestmentNpvModel {
    id: String,
    params: InvestmentParameters,
    profile: IndustryProfile,
}

impl InvestmentNpvModel {
    /// Variables this model reads from a sample.
    pub const DRIVERS: [&'static str; 6] = [
        "annual_revenue",
        "initial_investment",
        "annual_costs",
        "cost_escalation_rate",
        "discount_rate",
        "productivity_gain_rate",
    ];

    /// Model over `params` under `profile`.
    pub fn new(params: InvestmentParameters, profile: IndustryProfile) -> Self {
        let id = format!(
            "investment_npv({:.10};{:.10};{:.10};{:.10};{:.10};{};{};{};{:.10})",
            params.annual_revenue(),
            params.initial_investment(),
            params.annual_costs(),
            params.cost_escalation_rate(),
            params.discount_rate(),
            params.timeline_periods(),
            profile.industry,
            profile.company_size,
            profile.productivity_gain_rate,
        );
        Self {
            id,
            params,
            profile,
        }
    }

    /// Base values of the drivers, in [`Self::DRIVERS`] order.
    pub fn base_values(&self) -> [(&'static str, f64); 6] {
        [
            ("annual_revenue", self.params.annual_revenue()),
            ("initial_investment", self.params.initial_investment()),
            ("annual_costs", self.params.annual_costs()),
            ("cost_escalation_rate", self.params.cost_escalation_rate()),
            ("discount_rate", self.params.discount_rate()),
            ("productivity_gain_rate", self.profile.productivity_gain_rate),
        ]
    }

    fn try_evaluate(&self, sample: &Sample<'_>) -> Result<f64, EngineError> {
        let p = &self.params;
        let params = InvestmentParameters::builder()
            .annual_revenue(sample.get_or("annual_revenue", p.annual_revenue()))
            .initial_investment(sample.get_or("initial_investment", p.initial_investment()))
            .annual_costs(sample.get_or("annual_costs", p.annual_costs()))
            .cost_escalation_rate(sample.get_or("cost_escalation_rate", p.cost_escalation_rate()))
            .discount_rate(sample.get_or("discount_rate", p.discount_rate()))
            .timeline_periods(p.timeline_periods())
            .industry(p.industry())
            .company_size(p.company_size())
            .build()?;

        let mut profile = self.profile.clone();
        profile.productivity_gain_rate =
            sample.get_or("productivity_gain_rate", profile.productivity_gain_rate);

        let flows = project_cash_flows(&params, &profile)?;
        npv(&flows, monthly_rate(params.discount_rate()))
    }
}

impl OutcomeModel for InvestmentNpvModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn evaluate(&self, sample: &Sample<'_>) -> f64 {
        self.try_evaluate(sample).unwrap_or(f64::NAN)
    }
}
