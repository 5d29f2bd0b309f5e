//! Pairwise Pearson correlation of named series.

use std::collections::BTreeMap;

use roi_core::math::correlation::CorrelationMatrix;
use roi_core::math::statistics::pearson;
use roi_core::types::{CashFlowSeries, EngineError};
use serde::{Deserialize, Serialize};

/// Minimum observations per series.
pub const MIN_OBSERVATIONS: usize = 3;

/// Correlation matrix labelled with series names (sorted).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesCorrelation {
    names: Vec<String>,
    matrix: CorrelationMatrix,
}

impl SeriesCorrelation {
    /// Series names, in matrix order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &CorrelationMatrix {
        &self.matrix
    }

    /// Correlation between two named series.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.matrix.get(i, j))
    }
}

/// Pearson correlation between every pair in `series`.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] if `series` is empty, lengths differ or
///   a series is constant
/// - [`EngineError::InsufficientData`] if any series has fewer than
///   [`MIN_OBSERVATIONS`] values
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use roi_core::types::CashFlowSeries;
/// use roi_scenarios::correlation::correlation_matrix;
///
/// let mut series = BTreeMap::new();
/// series.insert("cloud".to_string(), CashFlowSeries::new(vec![1.0, 2.0, 3.0, 4.0]).unwrap());
/// series.insert("ai".to_string(), CashFlowSeries::new(vec![2.0, 4.0, 6.0, 8.5]).unwrap());
///
/// let corr = correlation_matrix(&series).unwrap();
/// assert_eq!(corr.names(), &["ai".to_string(), "cloud".to_string()]);
/// assert!(corr.get("ai", "cloud").unwrap() > 0.99);
/// ```
pub fn correlation_matrix(
    series: &BTreeMap<String, CashFlowSeries>,
) -> Result<SeriesCorrelation, EngineError> {
    if series.is_empty() {
        return Err(EngineError::invalid("series", "no series given"));
    }
    if let Some(short) = series.values().find(|s| s.len() < MIN_OBSERVATIONS) {
        return Err(EngineError::InsufficientData {
            got: short.len(),
            need: MIN_OBSERVATIONS,
        });
    }

    let names: Vec<String> = series.keys().cloned().collect();
    let columns: Vec<&[f64]> = series.values().map(CashFlowSeries::values).collect();
    let n = columns.len();

    let mut data = vec![0.0; n * n];
    for i in 0..n {
        data[i * n + i] = 1.0;
        for j in (i + 1)..n {
            let rho = pearson(columns[i], columns[j]).map_err(|err| match err {
                EngineError::InvalidInput { reason, .. } => EngineError::invalid(
                    "series",
                    format!("'{}' vs '{}': {reason}", names[i], names[j]),
                ),
                other => other,
            })?;
            data[i * n + j] = rho;
            data[j * n + i] = rho;
        }
    }
    if n == 1 {
        // a lone series still has to be non-constant to be meaningful
        pearson(columns[0], columns[0])?;
    }

    let matrix = CorrelationMatrix::new(&data, n)?;
    Ok(SeriesCorrelation { names, matrix })
}
