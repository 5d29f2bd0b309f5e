//! One-at-a-time sensitivity analysis and tornado ranking.
//!
//! Each variable is moved to `base·(1 − p)` and `base·(1 + p)` with every
//! other variable held at its base value. Elasticity is the central
//! difference
//!
//! ```text
//! ((O(high) − O(low)) / O(base)) / (2p)
//! ```
//!
//! i.e. percent change in output per percent change in input.

use std::collections::HashSet;

use roi_core::types::{EngineError, ScenarioDefinition, SensitivityEntry, SensitivityResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{OutcomeModel, Sample};

/// Named base values for every model input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseCase {
    names: Vec<String>,
    values: Vec<f64>,
}

impl BaseCase {
    /// Base case from `(name, value)` pairs.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] on an empty, duplicate or unnamed
    /// variable, or a non-finite value.
    pub fn new<I, S>(pairs: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<f64>) =
            pairs.into_iter().map(|(n, v)| (n.into(), v)).unzip();
        if names.is_empty() {
            return Err(EngineError::invalid("base_case", "no variables given"));
        }
        let mut seen = HashSet::with_capacity(names.len());
        for (name, value) in names.iter().zip(&values) {
            if name.is_empty() {
                return Err(EngineError::invalid("base_case", "variable name is empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(EngineError::invalid(
                    "base_case",
                    format!("duplicate variable '{name}'"),
                ));
            }
            if !value.is_finite() {
                return Err(EngineError::invalid(name.as_str(), "base value is not finite"));
            }
        }
        Ok(Self { names, values })
    }

    /// Base case at each variable's distribution mean.
    pub fn from_scenario(scenario: &ScenarioDefinition) -> Result<Self, EngineError> {
        scenario.validate()?;
        Self::new(
            scenario
                .variable_names()
                .into_iter()
                .zip(scenario.base_values()),
        )
    }

    /// Base value of `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Variable names in input order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Base values in input order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The base case as a model sample.
    pub fn sample(&self) -> Sample<'_> {
        Sample::from_parts(&self.names, &self.values)
    }
}

/// Perturb each of `variables` (all of them when empty) by ±`range_percent`
/// and rank by descending absolute elasticity; ties keep name order.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] if `range_percent` is outside (0, 100),
///   a variable is unknown or has a zero base value, or the base output is
///   zero
/// - [`EngineError::NonFiniteOutcome`] if any evaluation is NaN or infinite
///
/// # Examples
/// ```
/// use roi_scenarios::model::{FnModel, Sample};
/// use roi_scenarios::sensitivity::{sensitivity_analysis, BaseCase};
///
/// let base = BaseCase::new([("price", 10.0), ("volume", 100.0), ("fixed", 200.0)]).unwrap();
/// let profit = FnModel::new("profit", |s: &Sample<'_>| {
///     s.get_or("price", 0.0) * s.get_or("volume", 0.0) - s.get_or("fixed", 0.0)
/// });
///
/// let result = sensitivity_analysis(&base, &[], 10.0, &profit).unwrap();
/// assert_eq!(result.ranking(), vec!["price", "volume", "fixed"]);
/// assert!((result.elasticity("price").unwrap() - 1.25).abs() < 1e-9);
/// ```
pub fn sensitivity_analysis(
    base: &BaseCase,
    variables: &[String],
    range_percent: f64,
    model: &dyn OutcomeModel,
) -> Result<SensitivityResult, EngineError> {
    if !range_percent.is_finite() || range_percent <= 0.0 || range_percent >= 100.0 {
        return Err(EngineError::invalid(
            "range_percent",
            format!("must be in (0, 100), got {range_percent}"),
        ));
    }
    let p = range_percent / 100.0;

    let selected: Vec<usize> = if variables.is_empty() {
        (0..base.names.len()).collect()
    } else {
        variables
            .iter()
            .map(|name| {
                base.names.iter().position(|n| n == name).ok_or_else(|| {
                    EngineError::invalid("variables", format!("unknown variable '{name}'"))
                })
            })
            .collect::<Result<_, _>>()?
    };

    let mut non_finite = 0;
    let mut eval = |values: &[f64]| {
        let out = model.evaluate(&Sample::from_parts(&base.names, values));
        if !out.is_finite() {
            non_finite += 1;
        }
        out
    };

    let base_output = eval(&base.values);
    let mut scratch = base.values.clone();
    let mut entries = Vec::with_capacity(selected.len());
    for idx in selected {
        let base_value = base.values[idx];
        let low_value = base_value * (1.0 - p);
        let high_value = base_value * (1.0 + p);

        scratch[idx] = low_value;
        let low_output = eval(&scratch);
        scratch[idx] = high_value;
        let high_output = eval(&scratch);
        scratch[idx] = base_value;

        entries.push((idx, base_value, low_value, high_value, low_output, high_output));
    }

    if non_finite > 0 {
        return Err(EngineError::NonFiniteOutcome { count: non_finite });
    }
    if base_output == 0.0 {
        return Err(EngineError::invalid(
            "base_output",
            "model output is zero at the base case; elasticity is undefined",
        ));
    }

    let mut entries = entries
        .into_iter()
        .map(|(idx, base_value, low_value, high_value, low_output, high_output)| {
            let variable = base.names[idx].clone();
            if base_value == 0.0 {
                return Err(EngineError::invalid(
                    variable,
                    "base value is zero; a relative perturbation is undefined",
                ));
            }
            let elasticity = ((high_output - low_output) / base_output) / (2.0 * p);
            Ok(SensitivityEntry {
                variable,
                base_value,
                low_value,
                high_value,
                low_output,
                high_output,
                elasticity,
                swing: high_output - low_output,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    entries.sort_by(|a, b| {
        rank_magnitude(b.elasticity)
            .total_cmp(&rank_magnitude(a.elasticity))
            .then_with(|| a.variable.cmp(&b.variable))
    });
    debug!(
        model = model.model_id(),
        variables = entries.len(),
        range_percent,
        "Sensitivity analysis complete"
    );

    Ok(SensitivityResult {
        base_output,
        range_percent,
        entries,
    })
}

/// Significant digits kept when ranking, so rounding noise reads as a tie.
const RANK_DIGITS: i32 = 12;

/// `|elasticity|` rounded to [`RANK_DIGITS`] significant digits.
fn rank_magnitude(elasticity: f64) -> f64 {
    let magnitude = elasticity.abs();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return magnitude;
    }
    let scale = 10f64.powi(RANK_DIGITS - 1 - magnitude.log10().floor() as i32);
    (magnitude * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FnModel, LinearModel};
    use approx::assert_relative_eq;
    use roi_core::types::{Distribution, Variable};
    use std::collections::BTreeMap;

    fn linear() -> LinearModel {
        let mut c = BTreeMap::new();
        c.insert("a".to_string(), 1.0);
        c.insert("b".to_string(), 4.0);
        c.insert("c".to_string(), -2.0);
        LinearModel::new(0.0, c)
    }

    fn base() -> BaseCase {
        BaseCase::new([("a", 10.0), ("b", 5.0), ("c", 2.0)]).unwrap()
    }

    #[test]
    fn test_linear_elasticities() {
        // O = 10 + 20 - 4 = 26
        let result = sensitivity_analysis(&base(), &[], 10.0, &linear()).unwrap();
        assert_relative_eq!(result.base_output, 26.0);
        assert_relative_eq!(result.elasticity("a").unwrap(), 10.0 / 26.0, epsilon = 1e-12);
        assert_relative_eq!(result.elasticity("b").unwrap(), 20.0 / 26.0, epsilon = 1e-12);
        assert_relative_eq!(result.elasticity("c").unwrap(), -4.0 / 26.0, epsilon = 1e-12);
        assert_eq!(result.ranking(), vec!["b", "a", "c"]);
        assert_relative_eq!(result.entries[0].swing, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_elasticity() {
        let model = FnModel::new("sq", |s: &Sample<'_>| s.get_or("x", 0.0).powi(2));
        let base = BaseCase::new([("x", 3.0)]).unwrap();
        // ((1.1² - 0.9²) / 1) / 0.2 = 2
        let result = sensitivity_analysis(&base, &[], 10.0, &model).unwrap();
        assert_relative_eq!(result.elasticity("x").unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_subset_and_unknown_variable() {
        let subset = sensitivity_analysis(&base(), &["c".to_string()], 5.0, &linear()).unwrap();
        assert_eq!(subset.ranking(), vec!["c"]);

        let err = sensitivity_analysis(&base(), &["zz".to_string()], 5.0, &linear()).unwrap_err();
        assert!(err.to_string().contains("zz"));
    }

    #[test]
    fn test_ties_break_by_name() {
        let model = FnModel::new("sum", |s: &Sample<'_>| s.values().iter().sum());
        let base = BaseCase::new([("z", 1.0), ("m", 1.0), ("a", 1.0)]).unwrap();
        let result = sensitivity_analysis(&base, &[], 10.0, &model).unwrap();
        assert_eq!(result.ranking(), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_rounding_noise_ties_break_by_name() {
        // price and volume both have elasticity 1.25 up to rounding.
        let profit = FnModel::new("profit", |s: &Sample<'_>| {
            s.get_or("price", 0.0) * s.get_or("volume", 0.0) - s.get_or("fixed", 0.0)
        });
        let base = BaseCase::new([("volume", 100.0), ("price", 10.0), ("fixed", 200.0)]).unwrap();
        let result = sensitivity_analysis(&base, &[], 10.0, &profit).unwrap();
        assert_eq!(result.ranking(), vec!["price", "volume", "fixed"]);
        assert_relative_eq!(result.elasticity("volume").unwrap(), 1.25, epsilon = 1e-9);
    }

    #[test]
    fn test_rank_magnitude_collapses_noise() {
        assert_eq!(rank_magnitude(1.250_000_000_000_001_3), rank_magnitude(-1.25));
        assert!(rank_magnitude(1.250_000_001) > rank_magnitude(1.25));
        assert_eq!(rank_magnitude(0.0), 0.0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        for bad in [0.0, -5.0, 100.0, f64::NAN] {
            assert!(sensitivity_analysis(&base(), &[], bad, &linear()).is_err());
        }
    }

    #[test]
    fn test_zero_base_output_rejected() {
        let model = FnModel::new("zero", |_: &Sample<'_>| 0.0);
        let err = sensitivity_analysis(&base(), &[], 10.0, &model).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_zero_base_value_rejected() {
        let base = BaseCase::new([("a", 0.0), ("b", 5.0)]).unwrap();
        let err = sensitivity_analysis(&base, &[], 10.0, &linear()).unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_non_finite_reported() {
        let model = FnModel::new("blowup", |s: &Sample<'_>| {
            let a = s.get_or("a", 0.0);
            if a > 10.5 {
                f64::INFINITY
            } else {
                a
            }
        });
        let base = BaseCase::new([("a", 10.0)]).unwrap();
        let err = sensitivity_analysis(&base, &[], 10.0, &model).unwrap_err();
        assert_eq!(err, EngineError::NonFiniteOutcome { count: 1 });
    }

    #[test]
    fn test_base_case_validation_and_scenario_means() {
        assert!(BaseCase::new(Vec::<(String, f64)>::new()).is_err());
        assert!(BaseCase::new([("a", 1.0), ("a", 2.0)]).is_err());
        assert!(BaseCase::new([("a", f64::INFINITY)]).is_err());

        let scenario = ScenarioDefinition::new(
            "s",
            vec![
                Variable::new("u", Distribution::Uniform { low: 2.0, high: 4.0 }),
                Variable::new("n", Distribution::Normal { mean: 7.0, std_dev: 1.0 }),
            ],
            10,
        )
        .unwrap();
        let base = BaseCase::from_scenario(&scenario).unwrap();
        assert_eq!(base.get("u"), Some(3.0));
        assert_eq!(base.values(), &[3.0, 7.0]);
    }
}
