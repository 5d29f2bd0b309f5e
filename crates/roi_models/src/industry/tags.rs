//! Closed sets of industry and company-size tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tag string that matches no known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} tag '{tag}'")]
pub struct UnknownTag {
    /// Which tag set was searched (`industry` or `company size`)
    pub kind: &'static str,
    /// The unrecognised input
    pub tag: String,
}

/// Lower-case and unify separators so `"Financial Services"`,
/// `"financial-services"` and `"financial_services"` compare equal.
fn normalise(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Industry sectors with benchmark data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    /// Discrete and process manufacturing
    Manufacturing,
    /// Providers, payers and life sciences
    Healthcare,
    /// Banking, insurance, capital markets
    FinancialServices,
    /// Retail and e-commerce
    Retail,
    /// Software and hardware vendors
    Technology,
    /// Transport and supply chain
    Logistics,
    /// Utilities, oil and gas, renewables
    Energy,
    /// Schools and universities
    Education,
    /// Conservative fallback for anything else
    Generic,
}

impl Industry {
    /// Every variant, in declaration order.
    pub const ALL: [Industry; 9] = [
        Industry::Manufacturing,
        Industry::Healthcare,
        Industry::FinancialServices,
        Industry::Retail,
        Industry::Technology,
        Industry::Logistics,
        Industry::Energy,
        Industry::Education,
        Industry::Generic,
    ];

    /// Canonical snake_case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Manufacturing => "manufacturing",
            Industry::Healthcare => "healthcare",
            Industry::FinancialServices => "financial_services",
            Industry::Retail => "retail",
            Industry::Technology => "technology",
            Industry::Logistics => "logistics",
            Industry::Energy => "energy",
            Industry::Education => "education",
            Industry::Generic => "generic",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let industry = match normalise(s).as_str() {
            "manufacturing" => Industry::Manufacturing,
            "healthcare" | "health" => Industry::Healthcare,
            "financial_services" | "finance" | "banking" => Industry::FinancialServices,
            "retail" | "ecommerce" => Industry::Retail,
            "technology" | "tech" | "software" => Industry::Technology,
            "logistics" | "transportation" => Industry::Logistics,
            "energy" | "utilities" => Industry::Energy,
            "education" => Industry::Education,
            "generic" | "other" => Industry::Generic,
            _ => {
                return Err(UnknownTag {
                    kind: "industry",
                    tag: s.to_string(),
                })
            }
        };
        Ok(industry)
    }
}

/// Company size band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    /// Fewer than 50 employees
    Small,
    /// 50 to 999 employees
    #[default]
    Medium,
    /// 1,000 to 9,999 employees
    Large,
    /// 10,000 employees or more
    Enterprise,
}

impl CompanySize {
    /// Canonical snake_case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Small => "small",
            CompanySize::Medium => "medium",
            CompanySize::Large => "large",
            CompanySize::Enterprise => "enterprise",
        }
    }

    /// Multiplier on the industry productivity gain.
    pub fn productivity_factor(&self) -> f64 {
        match self {
            CompanySize::Small => 0.8,
            CompanySize::Medium => 1.0,
            CompanySize::Large => 1.1,
            CompanySize::Enterprise => 1.2,
        }
    }

    /// Multiplier on the industry risk premium.
    pub fn risk_factor(&self) -> f64 {
        match self {
            CompanySize::Small => 1.25,
            CompanySize::Medium => 1.0,
            CompanySize::Large => 0.9,
            CompanySize::Enterprise => 0.8,
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanySize {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = match normalise(s).as_str() {
            "small" | "smb" | "startup" => CompanySize::Small,
            "medium" | "mid" | "mid_market" => CompanySize::Medium,
            "large" => CompanySize::Large,
            "enterprise" => CompanySize::Enterprise,
            _ => {
                return Err(UnknownTag {
                    kind: "company size",
                    tag: s.to_string(),
                })
            }
        };
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_industry_parsing_is_lenient_on_format() {
        assert_eq!(
            "Financial Services".parse::<Industry>(),
            Ok(Industry::FinancialServices)
        );
        assert_eq!(
            "financial-services".parse::<Industry>(),
            Ok(Industry::FinancialServices)
        );
        assert_eq!("TECH".parse::<Industry>(), Ok(Industry::Technology));
    }

    #[test]
    fn test_unknown_industry() {
        let err = "aerospace".parse::<Industry>().unwrap_err();
        assert_eq!(err.kind, "industry");
        assert_eq!(err.to_string(), "Unknown industry tag 'aerospace'");
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for industry in Industry::ALL {
            assert_eq!(industry.to_string().parse::<Industry>(), Ok(industry));
        }
    }

    #[test]
    fn test_company_size() {
        assert_eq!("SMB".parse::<CompanySize>(), Ok(CompanySize::Small));
        assert_eq!(CompanySize::default(), CompanySize::Medium);
        assert!("huge".parse::<CompanySize>().is_err());
        assert_eq!(CompanySize::Medium.productivity_factor(), 1.0);
    }
}
