//! Industry benchmark registry.
//!
//! Profiles are built once at startup and are read-only afterwards, so a
//! registry can be shared across threads behind an `Arc` without locking.

use std::collections::BTreeMap;

use roi_core::types::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::tags::{CompanySize, Industry, UnknownTag};

/// Benchmark numbers for one industry, before company-size scaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndustryBenchmark {
    /// Annual productivity gain as a fraction of revenue
    pub productivity_gain_rate: f64,
    /// Typical months to recover the investment
    pub typical_payback_months: u32,
    /// Enterprise-value multiple applied to annual benefit
    pub valuation_multiple: f64,
    /// Risk premium over the risk-free rate
    pub risk_premium: f64,
}

impl IndustryBenchmark {
    const fn new(
        productivity_gain_rate: f64,
        typical_payback_months: u32,
        valuation_multiple: f64,
        risk_premium: f64,
    ) -> Self {
        Self {
            productivity_gain_rate,
            typical_payback_months,
            valuation_multiple,
            risk_premium,
        }
    }

    fn problems(&self, industry: Industry) -> Vec<String> {
        let mut errors = Vec::new();
        if !(0.0..=1.0).contains(&self.productivity_gain_rate) {
            errors.push(format!(
                "{industry}: productivity_gain_rate {} must be in [0, 1]",
                self.productivity_gain_rate
            ));
        }
        if self.typical_payback_months == 0 {
            errors.push(format!("{industry}: typical_payback_months must be positive"));
        }
        if !(self.valuation_multiple > 0.0 && self.valuation_multiple.is_finite()) {
            errors.push(format!(
                "{industry}: valuation_multiple {} must be positive",
                self.valuation_multiple
            ));
        }
        if !(self.risk_premium >= 0.0 && self.risk_premium.is_finite()) {
            errors.push(format!(
                "{industry}: risk_premium {} must be non-negative",
                self.risk_premium
            ));
        }
        errors
    }
}

/// Conservative defaults used for unrecognised industries.
const GENERIC: IndustryBenchmark = IndustryBenchmark::new(0.10, 24, 1.5, 0.050);

fn builtin_benchmark(industry: Industry) -> IndustryBenchmark {
    match industry {
        Industry::Manufacturing => IndustryBenchmark::new(0.18, 18, 2.1, 0.045),
        Industry::Healthcare => IndustryBenchmark::new(0.15, 24, 2.4, 0.060),
        Industry::FinancialServices => IndustryBenchmark::new(0.22, 14, 2.8, 0.040),
        Industry::Retail => IndustryBenchmark::new(0.14, 16, 1.9, 0.050),
        Industry::Technology => IndustryBenchmark::new(0.25, 12, 3.2, 0.055),
        Industry::Logistics => IndustryBenchmark::new(0.17, 18, 2.0, 0.045),
        Industry::Energy => IndustryBenchmark::new(0.12, 30, 1.7, 0.065),
        Industry::Education => IndustryBenchmark::new(0.10, 30, 1.5, 0.035),
        Industry::Generic => GENERIC,
    }
}

/// Benchmark parameters resolved for an industry and company size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndustryProfile {
    /// Resolved industry
    pub industry: Industry,
    /// Resolved company size
    pub company_size: CompanySize,
    /// Size-adjusted annual productivity gain rate
    pub productivity_gain_rate: f64,
    /// Typical payback in months
    pub typical_payback_months: u32,
    /// Valuation multiple
    pub valuation_multiple: f64,
    /// Size-adjusted risk premium
    pub risk_premium: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    industries: BTreeMap<String, IndustryBenchmark>,
}

/// Lookup from industry/company-size tags to [`IndustryProfile`].
///
/// # Examples
/// ```
/// use roi_models::industry::{CompanySize, Industry, IndustryRegistry};
///
/// let registry = IndustryRegistry::builtin();
/// let profile = registry.resolve("healthcare", "large");
/// assert_eq!(profile.industry, Industry::Healthcare);
/// assert_eq!(profile.company_size, CompanySize::Large);
///
/// // Unknown tags degrade to the generic profile.
/// let fallback = registry.resolve("asteroid mining", "medium");
/// assert_eq!(fallback.industry, Industry::Generic);
/// ```
#[derive(Clone, Debug)]
pub struct IndustryRegistry {
    benchmarks: BTreeMap<Industry, IndustryBenchmark>,
}

impl Default for IndustryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IndustryRegistry {
    /// Registry with the built-in benchmark table.
    pub fn builtin() -> Self {
        let benchmarks = Industry::ALL
            .iter()
            .map(|&industry| (industry, builtin_benchmark(industry)))
            .collect();
        Self { benchmarks }
    }

    /// Built-in table with overrides from TOML.
    ///
    /// ```toml
    /// [industries.healthcare]
    /// productivity_gain_rate = 0.2
    /// typical_payback_months = 20
    /// valuation_multiple = 2.5
    /// risk_premium = 0.05
    /// ```
    ///
    /// Unknown industry keys or fields are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: RegistryFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut overrides = BTreeMap::new();
        for (tag, benchmark) in file.industries {
            let industry: Industry = tag
                .parse()
                .map_err(|e: UnknownTag| ConfigError::Parse(e.to_string()))?;
            overrides.insert(industry, benchmark);
        }

        let errors: Vec<String> = overrides
            .iter()
            .flat_map(|(industry, benchmark)| benchmark.problems(*industry))
            .collect();
        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        let mut registry = Self::builtin();
        registry.benchmarks.extend(overrides);
        Ok(registry)
    }

    /// Unscaled benchmark for `industry`.
    pub fn benchmark(&self, industry: Industry) -> IndustryBenchmark {
        self.benchmarks.get(&industry).copied().unwrap_or(GENERIC)
    }

    /// Profile for typed tags.
    pub fn profile(&self, industry: Industry, company_size: CompanySize) -> IndustryProfile {
        let base = self.benchmark(industry);
        IndustryProfile {
            industry,
            company_size,
            productivity_gain_rate: (base.productivity_gain_rate
                * company_size.productivity_factor())
            .min(1.0),
            typical_payback_months: base.typical_payback_months,
            valuation_multiple: base.valuation_multiple,
            risk_premium: base.risk_premium * company_size.risk_factor(),
        }
    }

    /// Profile for free-form tags. Never fails: unknown industries resolve
    /// to [`Industry::Generic`], unknown sizes to [`CompanySize::Medium`].
    pub fn resolve(&self, industry_tag: &str, company_size_tag: &str) -> IndustryProfile {
        let industry = industry_tag.parse().unwrap_or_else(|_| {
            warn!(tag = industry_tag, "Unknown industry tag, using generic profile");
            Industry::Generic
        });
        let company_size = company_size_tag.parse().unwrap_or_else(|_| {
            warn!(
                tag = company_size_tag,
                "Unknown company size tag, using medium"
            );
            CompanySize::Medium
        });
        self.profile(industry, company_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_covers_every_industry() {
        let registry = IndustryRegistry::builtin();
        for industry in Industry::ALL {
            assert!(registry.benchmark(industry).problems(industry).is_empty());
        }
    }

    #[test]
    fn test_size_scaling() {
        let registry = IndustryRegistry::builtin();
        let medium = registry.profile(Industry::Retail, CompanySize::Medium);
        let small = registry.profile(Industry::Retail, CompanySize::Small);
        assert_relative_eq!(medium.productivity_gain_rate, 0.14);
        assert_relative_eq!(small.productivity_gain_rate, 0.14 * 0.8);
        assert_relative_eq!(small.risk_premium, 0.05 * 1.25);
        assert_eq!(small.typical_payback_months, medium.typical_payback_months);
    }

    #[test]
    fn test_resolve_falls_back() {
        let registry = IndustryRegistry::builtin();
        let profile = registry.resolve("", "gigantic");
        assert_eq!(profile.industry, Industry::Generic);
        assert_eq!(profile.company_size, CompanySize::Medium);
        assert_eq!(profile, registry.profile(Industry::Generic, CompanySize::Medium));
    }

    #[test]
    fn test_toml_override() {
        let registry = IndustryRegistry::from_toml_str(
            r#"
            [industries.energy]
            productivity_gain_rate = 0.3
            typical_payback_months = 10
            valuation_multiple = 4.0
            risk_premium = 0.02
            "#,
        )
        .unwrap();
        assert_eq!(registry.benchmark(Industry::Energy).typical_payback_months, 10);
        assert_eq!(
            registry.benchmark(Industry::Retail),
            IndustryRegistry::builtin().benchmark(Industry::Retail)
        );
    }

    #[test]
    fn test_toml_rejects_unknown_industry() {
        let err = IndustryRegistry::from_toml_str(
            "[industries.aerospace]\nproductivity_gain_rate = 0.1\ntypical_payback_months = 1\nvaluation_multiple = 1.0\nrisk_premium = 0.0",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_rejects_out_of_range_values() {
        let err = IndustryRegistry::from_toml_str(
            "[industries.retail]\nproductivity_gain_rate = 1.5\ntypical_payback_months = 0\nvaluation_multiple = 1.0\nrisk_premium = 0.0",
        )
        .unwrap_err();
        match err {
            ConfigError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
