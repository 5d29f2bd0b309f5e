//! Descriptive statistics over sample slices.
//!
//! Percentiles use the sort-based closest-ranks method with linear
//! interpolation (`h = (n - 1) * p`), so results are reproducible for a
//! fixed sample set.

use crate::types::EngineError;

/// Arithmetic mean.
///
/// # Errors
///
/// [`EngineError::InsufficientData`] for an empty slice.
pub fn mean(values: &[f64]) -> Result<f64, EngineError> {
    if values.is_empty() {
        return Err(EngineError::InsufficientData { got: 0, need: 1 });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator). Zero for one sample.
///
/// # Errors
///
/// [`EngineError::InsufficientData`] for an empty slice.
pub fn sample_std_dev(values: &[f64]) -> Result<f64, EngineError> {
    let m = mean(values)?;
    if values.len() == 1 {
        return Ok(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / (values.len() - 1) as f64).sqrt())
}

/// Sort in place by IEEE total order.
pub fn sort_samples(values: &mut [f64]) {
    values.sort_unstable_by(f64::total_cmp);
}

/// Percentile of an already sorted slice, `p` given as a fraction in `[0, 1]`.
///
/// # Errors
///
/// - [`EngineError::InsufficientData`] for an empty slice
/// - [`EngineError::InvalidInput`] if `p` is outside `[0, 1]`
///
/// # Examples
/// ```
/// use roi_core::math::statistics::percentile_sorted;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile_sorted(&sorted, 0.5).unwrap(), 2.5);
/// assert_eq!(percentile_sorted(&sorted, 1.0).unwrap(), 4.0);
/// ```
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Result<f64, EngineError> {
    if sorted.is_empty() {
        return Err(EngineError::InsufficientData { got: 0, need: 1 });
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(EngineError::invalid(
            "percentile",
            format!("level {p} is outside [0, 1]"),
        ));
    }

    let n = sorted.len();
    if n == 1 {
        return Ok(sorted[0]);
    }

    let rank = p * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        Ok(sorted[lower])
    } else {
        let w = rank - lower as f64;
        Ok(sorted[lower] * (1.0 - w) + sorted[upper] * w)
    }
}

/// Pearson product-moment correlation of two equally long samples.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] if lengths differ or either sample has
///   zero variance
/// - [`EngineError::InsufficientData`] with fewer than 3 observations
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, EngineError> {
    if x.len() != y.len() {
        return Err(EngineError::invalid(
            "series",
            format!("length mismatch: {} vs {}", x.len(), y.len()),
        ));
    }
    if x.len() < 3 {
        return Err(EngineError::InsufficientData {
            got: x.len(),
            need: 3,
        });
    }

    let mx = mean(x)?;
    let my = mean(y)?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(EngineError::invalid(
            "series",
            "correlation is undefined for a constant series",
        ));
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
