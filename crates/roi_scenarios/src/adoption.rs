//! Logistic adoption S-curve.
//!
//! `A(t) = max / (1 + exp(−rate·(t − midpoint)))`, with the midpoint chosen
//! so that `A(0) = current`:
//!
//! ```text
//! midpoint = ln(max / current − 1) / rate
//! ```

use roi_core::types::EngineError;
use serde::{Deserialize, Serialize};

/// A validated S-curve through `(0, current)` saturating at `max`.
///
/// ```
/// use roi_scenarios::adoption::AdoptionCurve;
///
/// let curve = AdoptionCurve::new(0.05, 0.8, 0.5).unwrap();
/// assert!((curve.at(0.0).unwrap() - 0.05).abs() < 1e-12);
/// assert!((curve.at(curve.midpoint()).unwrap() - 0.4).abs() < 1e-12);
/// assert!(curve.at(100.0).unwrap() > 0.7999);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdoptionCurve {
    current: f64,
    max: f64,
    rate: f64,
    midpoint: f64,
}

impl AdoptionCurve {
    /// Fit the curve.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] if any argument is non-finite,
    /// `current <= 0`, `max <= current` or `rate <= 0`.
    pub fn new(current: f64, max: f64, rate: f64) -> Result<Self, EngineError> {
        if !current.is_finite() || current <= 0.0 {
            return Err(EngineError::invalid(
                "current_adoption",
                format!("must be positive, got {current}"),
            ));
        }
        if !max.is_finite() || max <= current {
            return Err(EngineError::invalid(
                "max_adoption",
                format!("must exceed current adoption {current}, got {max}"),
            ));
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(EngineError::invalid(
                "rate",
                format!("must be positive, got {rate}"),
            ));
        }
        let midpoint = (max / current - 1.0).ln() / rate;
        Ok(Self {
            current,
            max,
            rate,
            midpoint,
        })
    }

    /// Time at which adoption reaches half of `max`.
    pub fn midpoint(&self) -> f64 {
        self.midpoint
    }

    /// Saturation level.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Adoption at `t = 0`.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Adoption at `time_elapsed`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] if `time_elapsed` is not finite.
    pub fn at(&self, time_elapsed: f64) -> Result<f64, EngineError> {
        if !time_elapsed.is_finite() {
            return Err(EngineError::invalid("time_elapsed", "must be finite"));
        }
        Ok(self.max / (1.0 + (-self.rate * (time_elapsed - self.midpoint)).exp()))
    }

    /// `(t, A(t))` for `t = 0, step, 2·step, ...` up to and including
    /// `horizon`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] if `step <= 0` or `horizon < 0`.
    pub fn sample(&self, horizon: f64, step: f64) -> Result<Vec<(f64, f64)>, EngineError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(EngineError::invalid("step", "must be positive"));
        }
        if !horizon.is_finite() || horizon < 0.0 {
            return Err(EngineError::invalid("horizon", "must be non-negative"));
        }
        // tolerate rounding at the last grid point
        let points = (horizon / step + 1e-9).floor() as usize + 1;
        (0..points)
            .map(|i| {
                let t = i as f64 * step;
                self.at(t).map(|a| (t, a))
            })
            .collect()
    }
}

/// Adoption at `time_elapsed` on the curve through `(0, current_adoption)`.
///
/// # Errors
///
/// See [`AdoptionCurve::new`] and [`AdoptionCurve::at`].
pub fn adoption_s_curve(
    current_adoption: f64,
    max_adoption: f64,
    rate: f64,
    time_elapsed: f64,
) -> Result<f64, EngineError> {
    AdoptionCurve::new(current_adoption, max_adoption, rate)?.at(time_elapsed)
}

/// The curve sampled every `step` up to `horizon`.
pub fn adoption_curve(
    current_adoption: f64,
    max_adoption: f64,
    rate: f64,
    horizon: f64,
    step: f64,
) -> Result<Vec<(f64, f64)>, EngineError> {
    AdoptionCurve::new(current_adoption, max_adoption, rate)?.sample(horizon, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_invalid_parameters() {
        assert!(adoption_s_curve(0.5, 0.5, 1.0, 0.0).is_err());
        assert!(adoption_s_curve(0.6, 0.5, 1.0, 0.0).is_err());
        assert!(adoption_s_curve(0.1, 0.5, 0.0, 0.0).is_err());
        assert!(adoption_s_curve(0.1, 0.5, -1.0, 0.0).is_err());
        assert!(adoption_s_curve(0.0, 0.5, 1.0, 0.0).is_err());
        assert!(adoption_s_curve(0.1, 0.5, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_saturates() {
        let far = adoption_s_curve(0.02, 0.9, 0.3, 1_000.0).unwrap();
        assert_relative_eq!(far, 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_current_above_half_has_negative_midpoint() {
        let curve = AdoptionCurve::new(0.7, 1.0, 1.0).unwrap();
        assert!(curve.midpoint() < 0.0);
        assert_relative_eq!(curve.at(0.0).unwrap(), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_sampled_series() {
        let series = adoption_curve(0.1, 1.0, 0.8, 12.0, 0.1).unwrap();
        assert_eq!(series.len(), 121);
        assert_relative_eq!(series[0].1, 0.1, epsilon = 1e-12);
        assert!(series.windows(2).all(|w| w[1].1 > w[0].1));
        assert!(adoption_curve(0.1, 1.0, 0.8, 12.0, 0.0).is_err());
        assert!(adoption_curve(0.1, 1.0, 0.8, -1.0, 1.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_passes_through_current(
            current in 0.001..0.9_f64,
            headroom in 0.01..10.0_f64,
            rate in 0.01..5.0_f64,
        ) {
            let max = current + headroom;
            let at_zero = adoption_s_curve(current, max, rate, 0.0).unwrap();
            prop_assert!((at_zero - current).abs() <= 1e-9 * max);
        }

        #[test]
        fn prop_monotone_and_bounded(
            current in 0.001..0.9_f64,
            headroom in 0.01..10.0_f64,
            rate in 0.01..5.0_f64,
            t in 0.0..50.0_f64,
            dt in 0.001..10.0_f64,
        ) {
            let curve = AdoptionCurve::new(current, current + headroom, rate).unwrap();
            let a = curve.at(t).unwrap();
            let b = curve.at(t + dt).unwrap();
            prop_assert!(b >= a);
            prop_assert!(b <= curve.max());
        }
    }
}
