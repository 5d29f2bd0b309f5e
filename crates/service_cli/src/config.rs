//! Loading engine configuration and job files.

use std::path::Path;

use roi_core::config::EngineConfig;
use roi_core::types::ScenarioDefinition;
use roi_models::industry::IndustryRegistry;
use roi_models::investment::InvestmentParameters;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{CliError, Result};

/// Default configuration file name, optional when absent.
pub const DEFAULT_CONFIG_FILE: &str = "roi.toml";

/// Engine configuration from `path` with `ROI_*` overrides applied.
///
/// A missing file is an error unless `path` is the default name, in which
/// case built-in defaults are used.
pub fn load_engine_config(path: &str) -> Result<EngineConfig> {
    let config = if Path::new(path).exists() {
        info!(path, "Loading configuration");
        EngineConfig::load(Path::new(path))?
    } else if path == DEFAULT_CONFIG_FILE {
        debug!("No configuration file, using defaults");
        EngineConfig::default()
    } else {
        return Err(CliError::FileNotFound(path.to_string()));
    };
    let config = config.with_env_override();
    config.validate()?;
    Ok(config)
}

/// Built-in benchmarks, or the overrides in `path` when given.
pub fn load_registry(path: Option<&str>) -> Result<IndustryRegistry> {
    match path {
        None => Ok(IndustryRegistry::builtin()),
        Some(path) => {
            let text = read(path)?;
            info!(path, "Loading industry benchmarks");
            Ok(IndustryRegistry::from_toml_str(&text)?)
        }
    }
}

/// Sensitivity options inside a job file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensitivityJob {
    /// Drivers to perturb; all non-zero drivers when empty
    #[serde(default)]
    pub variables: Vec<String>,
    /// Perturbation in percent
    pub range_percent: Option<f64>,
}

/// One analysis job.
///
/// ```toml
/// risk_free_rate = 0.03
///
/// [investment]
/// annual_revenue = 4000000.0
/// initial_investment = 250000.0
/// timeline_periods = 36
/// industry = "healthcare"
///
/// [scenario]
/// name = "rollout"
/// iterations = 10000
/// [[scenario.variables]]
/// name = "productivity_gain_rate"
/// distribution = { kind = "triangular", low = 0.08, mode = 0.15, high = 0.2 }
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    /// Annual risk-free rate for the risk-adjusted return
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// The investment under analysis
    pub investment: InvestmentParameters,
    /// Uncertain drivers for `simulate`
    pub scenario: Option<ScenarioDefinition>,
    /// Options for `sensitivity`
    #[serde(default)]
    pub sensitivity: SensitivityJob,
}

fn default_risk_free_rate() -> f64 {
    0.03
}

impl JobFile {
    /// Parse a job from TOML text.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and parse the job at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let text = read(path)?;
        Self::from_toml_str(&text).map_err(|e| CliError::Input {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// The scenario, or an error naming the missing section.
    pub fn require_scenario(&self) -> Result<&ScenarioDefinition> {
        self.scenario.as_ref().ok_or_else(|| {
            CliError::InvalidArgument("job file has no [scenario] section".to_string())
        })
    }
}

fn read(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    std::fs::read_to_string(path).map_err(|e| CliError::Input {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_models::industry::Industry;

    const JOB: &str = r#"
        [investment]
        annual_revenue = 4000000.0
        initial_investment = 250000.0
        timeline_periods = 36
        industry = "healthcare"

        [scenario]
        name = "rollout"
        iterations = 500
        seed = 3

        [[scenario.variables]]
        name = "annual_costs"
        distribution = { kind = "uniform", low = 10000.0, high = 20000.0 }
    "#;

    #[test]
    fn test_parse_job() {
        let job = JobFile::from_toml_str(JOB).unwrap();
        assert_eq!(job.risk_free_rate, 0.03);
        assert_eq!(job.investment.industry(), Industry::Healthcare);
        let scenario = job.require_scenario().unwrap();
        assert_eq!(scenario.iterations, 500);
        assert_eq!(scenario.seed, Some(3));
        assert!(job.sensitivity.variables.is_empty());
    }

    #[test]
    fn test_invalid_investment_rejected() {
        let bad = JOB.replace("initial_investment = 250000.0", "initial_investment = -1.0");
        assert!(JobFile::from_toml_str(&bad).is_err());
    }

    #[test]
    fn test_missing_scenario() {
        let job = JobFile::from_toml_str(&JOB[..JOB.find("[scenario]").unwrap()]).unwrap();
        assert!(matches!(
            job.require_scenario(),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_demo_files_parse() {
        let job = JobFile::from_toml_str(include_str!("../../../demo/jobs/retail_rollout.toml"))
            .unwrap();
        assert_eq!(job.investment.industry(), Industry::Retail);
        let scenario = job.require_scenario().unwrap();
        assert_eq!(scenario.variables.len(), 2);
        assert!(scenario.correlation.is_some());
        assert_eq!(job.sensitivity.range_percent, Some(10.0));

        let config = EngineConfig::from_toml_str(include_str!("../../../demo/roi.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.parallel_threshold, 2000);
        assert_eq!(config.cache.monte_carlo.capacity, 32);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        assert!(matches!(
            load_engine_config("definitely/not/here.toml"),
            Err(CliError::FileNotFound(_))
        ));
    }
}
