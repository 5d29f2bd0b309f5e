//! Risk-adjusted return.

use std::fmt;
use std::str::FromStr;

use roi_core::config::RiskPremiums;
use roi_core::types::EngineError;
use serde::{Deserialize, Serialize};

use crate::industry::UnknownTag;

/// Industry risk premium below which an investment counts as low risk.
const LOW_RISK_PREMIUM_CEILING: f64 = 0.04;
/// Industry risk premium at or above which an investment counts as high risk.
const HIGH_RISK_PREMIUM_FLOOR: f64 = 0.06;

/// Qualitative risk band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Multiplier 0.5 by default
    Low,
    /// Multiplier 1.0 by default
    Medium,
    /// Multiplier 1.8 by default
    High,
}

impl RiskLevel {
    /// Multiplier for this level from `premiums`.
    pub fn multiplier(&self, premiums: &RiskPremiums) -> f64 {
        match self {
            RiskLevel::Low => premiums.low,
            RiskLevel::Medium => premiums.medium,
            RiskLevel::High => premiums.high,
        }
    }

    /// Band an industry risk premium: below 4% low, 6% and above high.
    ///
    /// ```
    /// use roi_models::calculator::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::from_risk_premium(0.035), RiskLevel::Low);
    /// assert_eq!(RiskLevel::from_risk_premium(0.05), RiskLevel::Medium);
    /// assert_eq!(RiskLevel::from_risk_premium(0.065), RiskLevel::High);
    /// ```
    pub fn from_risk_premium(premium: f64) -> Self {
        if premium < LOW_RISK_PREMIUM_CEILING {
            RiskLevel::Low
        } else if premium < HIGH_RISK_PREMIUM_FLOOR {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        })
    }
}

impl FromStr for RiskLevel {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(UnknownTag {
                kind: "risk level",
                tag: s.to_string(),
            }),
        }
    }
}

/// `risk_free_rate + multiplier(level) · (expected_return - risk_free_rate)`
/// with the default multipliers (0.5 / 1.0 / 1.8).
///
/// ```
/// use roi_models::calculator::{risk_adjusted_return, RiskLevel};
///
/// let r = risk_adjusted_return(0.12, RiskLevel::High, 0.02).unwrap();
/// assert!((r - 0.20).abs() < 1e-12);
/// ```
pub fn risk_adjusted_return(
    expected_return: f64,
    level: RiskLevel,
    risk_free_rate: f64,
) -> Result<f64, EngineError> {
    risk_adjusted_return_with(expected_return, level, risk_free_rate, &RiskPremiums::default())
}

/// [`risk_adjusted_return`] with explicit multipliers.
///
/// # Errors
///
/// [`EngineError::InvalidInput`] if any rate is not finite.
pub fn risk_adjusted_return_with(
    expected_return: f64,
    level: RiskLevel,
    risk_free_rate: f64,
    premiums: &RiskPremiums,
) -> Result<f64, EngineError> {
    if !expected_return.is_finite() {
        return Err(EngineError::invalid("expected_return", "must be finite"));
    }
    if !risk_free_rate.is_finite() {
        return Err(EngineError::invalid("risk_free_rate", "must be finite"));
    }
    Ok(risk_free_rate + level.multiplier(premiums) * (expected_return - risk_free_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_medium_is_identity() {
        assert_relative_eq!(
            risk_adjusted_return(0.15, RiskLevel::Medium, 0.03).unwrap(),
            0.15,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_low_halves_excess() {
        assert_relative_eq!(
            risk_adjusted_return(0.15, RiskLevel::Low, 0.03).unwrap(),
            0.09,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_custom_premiums() {
        let premiums = RiskPremiums {
            low: 0.1,
            medium: 0.2,
            high: 3.0,
        };
        assert_relative_eq!(
            risk_adjusted_return_with(0.10, RiskLevel::High, 0.0, &premiums).unwrap(),
            0.30,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rejects_nan() {
        assert!(risk_adjusted_return(f64::NAN, RiskLevel::Low, 0.0).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(" High ".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert!("extreme".parse::<RiskLevel>().is_err());
    }
}
