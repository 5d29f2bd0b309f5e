//! Ordered series of signed monetary amounts.

use serde::{Deserialize, Serialize};

use super::EngineError;

/// Ordered sequence of signed monetary amounts, one per period.
///
/// The series is guaranteed non-empty and every value finite. An initial
/// outlay is encoded as a negative entry at index 0.
///
/// # Examples
/// ```
/// use roi_core::types::CashFlowSeries;
///
/// let flows = CashFlowSeries::new(vec![-1000.0, 300.0, 300.0]).unwrap();
/// assert_eq!(flows.len(), 3);
/// assert_eq!(flows.total(), -400.0);
///
/// assert!(CashFlowSeries::new(vec![]).is_err());
/// assert!(CashFlowSeries::new(vec![1.0, f64::NAN]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CashFlowSeries {
    values: Vec<f64>,
}

impl CashFlowSeries {
    /// Creates a validated series.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if `values` is empty or contains
    /// a non-finite amount.
    pub fn new(values: Vec<f64>) -> Result<Self, EngineError> {
        if values.is_empty() {
            return Err(EngineError::invalid(
                "cash_flows",
                "series must contain at least one period",
            ));
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(EngineError::invalid(
                "cash_flows",
                format!("value at period {idx} is not finite"),
            ));
        }
        Ok(Self { values })
    }

    /// Builds the conventional investment shape: `-outlay` at t=0 followed
    /// by the periodic inflows.
    pub fn with_outlay(outlay: f64, inflows: &[f64]) -> Result<Self, EngineError> {
        let mut values = Vec::with_capacity(inflows.len() + 1);
        values.push(-outlay);
        values.extend_from_slice(inflows);
        Self::new(values)
    }

    /// Number of periods.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; present for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the underlying amounts.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Undiscounted sum of all periods.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Number of sign changes, ignoring zero entries.
    ///
    /// More than one sign change means the IRR may not be unique.
    pub fn sign_changes(&self) -> usize {
        let mut changes = 0;
        let mut last_sign = 0.0_f64;
        for &v in &self.values {
            if v == 0.0 {
                continue;
            }
            let sign = v.signum();
            if last_sign != 0.0 && sign != last_sign {
                changes += 1;
            }
            last_sign = sign;
        }
        changes
    }

    /// Consume the series, returning the raw amounts.
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl TryFrom<Vec<f64>> for CashFlowSeries {
    type Error = EngineError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<CashFlowSeries> for Vec<f64> {
    fn from(series: CashFlowSeries) -> Self {
        series.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        let err = CashFlowSeries::new(Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_infinite() {
        let err = CashFlowSeries::new(vec![1.0, f64::INFINITY]).unwrap_err();
        assert!(err.to_string().contains("period 1"));
    }

    #[test]
    fn test_with_outlay() {
        let flows = CashFlowSeries::with_outlay(1000.0, &[400.0, 700.0]).unwrap();
        assert_eq!(flows.values(), &[-1000.0, 400.0, 700.0]);
    }

    #[test]
    fn test_sign_changes() {
        let conventional = CashFlowSeries::new(vec![-100.0, 0.0, 50.0, 60.0]).unwrap();
        assert_eq!(conventional.sign_changes(), 1);

        let non_conventional = CashFlowSeries::new(vec![-100.0, 230.0, -132.0]).unwrap();
        assert_eq!(non_conventional.sign_changes(), 2);
    }

    #[test]
    fn test_serde_validates() {
        let ok: Result<CashFlowSeries, _> = parse_toml_flows("[-1.0, 2.0]");
        assert!(ok.is_ok());
    }

    fn parse_toml_flows(array: &str) -> Result<CashFlowSeries, toml::de::Error> {
        #[derive(Deserialize)]
        struct Wrapper {
            flows: CashFlowSeries,
        }
        let doc = format!("flows = {array}");
        toml::from_str::<Wrapper>(&doc).map(|w| w.flows)
    }

    #[test]
    fn test_serde_rejects_empty() {
        assert!(parse_toml_flows("[]").is_err());
    }
}
