//! `AnalysisEngine`: the cached entry point for callers.
//!
//! NPV, IRR, Monte Carlo and sensitivity calls consult the injected
//! [`CacheManager`] first. Partial Monte Carlo results (timeout or iteration
//! cap) are returned but never cached.

use std::sync::Arc;

use crossbeam_channel::Sender;
use roi_cache::{CacheKey, CacheManager, CalculationKind};
use roi_core::config::{EngineConfig, SolverSettings};
use roi_core::types::{
    CashFlowSeries, EngineError, ScenarioDefinition, SensitivityResult, SimulationResult,
};
use roi_models::analysis::{analyze_investment, InvestmentMetrics};
use roi_models::calculator::FinancialCalculator;
use roi_models::industry::{IndustryProfile, IndustryRegistry};
use roi_models::investment::InvestmentParameters;
use serde::Serialize;
use tracing::{debug, warn};

use crate::coordinator::ChunkProgress;
use crate::model::OutcomeModel;
use crate::monte_carlo::MonteCarloSimulator;
use crate::sensitivity::{sensitivity_analysis, BaseCase};

#[derive(Serialize)]
struct IrrInput<'a> {
    flows: &'a [f64],
    solver: &'a SolverSettings,
}

#[derive(Serialize)]
struct SimulationInput<'a> {
    scenario: &'a ScenarioDefinition,
    model: &'a str,
    seed: u64,
    chunk_size: usize,
    iteration_cap: Option<usize>,
}

#[derive(Serialize)]
struct SensitivityInput<'a> {
    base: &'a BaseCase,
    variables: &'a [String],
    range_percent: f64,
    model: &'a str,
}

/// Facade over the calculator, registry, scenario engine and caches.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use roi_cache::CacheManager;
/// use roi_core::config::EngineConfig;
/// use roi_core::types::CashFlowSeries;
/// use roi_models::industry::IndustryRegistry;
/// use roi_scenarios::AnalysisEngine;
///
/// let config = EngineConfig::default();
/// let caches = Arc::new(CacheManager::new(&config.cache));
/// let engine = AnalysisEngine::new(config, caches.clone(), Arc::new(IndustryRegistry::builtin()));
///
/// let flows = CashFlowSeries::new(vec![-1000.0, 1100.0]).unwrap();
/// let first = engine.irr(&flows).unwrap();
/// let second = engine.irr(&flows).unwrap();
/// assert_eq!(first.to_bits(), second.to_bits());
/// assert_eq!(caches.report().irr.hits, 1);
/// ```
#[derive(Debug)]
pub struct AnalysisEngine {
    config: EngineConfig,
    caches: Arc<CacheManager>,
    registry: Arc<IndustryRegistry>,
    calculator: FinancialCalculator,
    simulator: MonteCarloSimulator,
}

impl AnalysisEngine {
    /// Engine over explicit collaborators.
    pub fn new(
        config: EngineConfig,
        caches: Arc<CacheManager>,
        registry: Arc<IndustryRegistry>,
    ) -> Self {
        let calculator = FinancialCalculator::from_config(&config);
        let simulator = MonteCarloSimulator::new(config.simulation.clone());
        Self {
            config,
            caches,
            registry,
            calculator,
            simulator,
        }
    }

    /// Engine with default configuration, fresh caches and built-in
    /// benchmarks.
    pub fn with_defaults() -> Self {
        let config = EngineConfig::default();
        let caches = Arc::new(CacheManager::new(&config.cache));
        Self::new(config, caches, Arc::new(IndustryRegistry::builtin()))
    }

    /// Report Monte Carlo chunk completions on `sender`.
    pub fn with_progress(mut self, sender: Sender<ChunkProgress>) -> Self {
        self.simulator = self.simulator.with_progress(sender);
        self
    }

    /// Configuration in force.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared caches.
    pub fn caches(&self) -> &Arc<CacheManager> {
        &self.caches
    }

    /// Industry benchmarks.
    pub fn registry(&self) -> &IndustryRegistry {
        &self.registry
    }

    /// Uncached calculator configured like this engine.
    pub fn calculator(&self) -> &FinancialCalculator {
        &self.calculator
    }

    /// Profile for free-form tags; unknown tags fall back to generic.
    pub fn resolve_profile(&self, industry_tag: &str, company_size_tag: &str) -> IndustryProfile {
        self.registry.resolve(industry_tag, company_size_tag)
    }

    /// Cached NPV.
    pub fn npv(&self, cash_flows: &CashFlowSeries, rate: f64) -> Result<f64, EngineError> {
        self.caches
            .npv()
            .get_or_compute(&(cash_flows.values(), rate), || {
                self.calculator.npv(cash_flows, rate)
            })
    }

    /// Cached IRR. The key includes the solver settings.
    pub fn irr(&self, cash_flows: &CashFlowSeries) -> Result<f64, EngineError> {
        let input = IrrInput {
            flows: cash_flows.values(),
            solver: &self.config.solver,
        };
        self.caches
            .irr()
            .get_or_compute(&input, || self.calculator.irr(cash_flows))
    }

    /// Metric bundle for `params` using the registry profile of its
    /// industry and company size.
    pub fn analyze(
        &self,
        params: &InvestmentParameters,
        risk_free_rate: f64,
    ) -> Result<InvestmentMetrics, EngineError> {
        let profile = self.registry.profile(params.industry(), params.company_size());
        analyze_investment(params, &profile, &self.calculator, risk_free_rate)
    }

    /// Cached Monte Carlo.
    ///
    /// The key covers the scenario, the model id, the effective seed and
    /// every setting that changes the draws. Partial results are not
    /// cached.
    pub fn monte_carlo(
        &self,
        definition: &ScenarioDefinition,
        model: &dyn OutcomeModel,
    ) -> Result<SimulationResult, EngineError> {
        let settings = self.simulator.settings();
        let input = SimulationInput {
            scenario: definition,
            model: model.model_id(),
            seed: self.simulator.effective_seed(definition),
            chunk_size: settings.chunk_size,
            iteration_cap: settings.iteration_cap,
        };
        let cache = self.caches.monte_carlo();
        let key = match CacheKey::derive(CalculationKind::MonteCarlo, &input) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(error = %err, "Cache key unavailable, simulating uncached");
                None
            }
        };
        if let Some(hit) = key.as_ref().and_then(|k| cache.get(k)) {
            return Ok(hit);
        }

        let result = self.simulator.run(definition, model)?;
        match key {
            Some(key) if !result.is_partial() => cache.insert(key, result.clone()),
            Some(_) => debug!(scenario = %definition.name, "Partial result not cached"),
            None => {}
        }
        Ok(result)
    }

    /// Cached sensitivity analysis; `range_percent` defaults to the
    /// configured value.
    pub fn sensitivity(
        &self,
        base: &BaseCase,
        variables: &[String],
        range_percent: Option<f64>,
        model: &dyn OutcomeModel,
    ) -> Result<SensitivityResult, EngineError> {
        let range_percent =
            range_percent.unwrap_or(self.config.sensitivity.default_range_percent);
        let input = SensitivityInput {
            base,
            variables,
            range_percent,
            model: model.model_id(),
        };
        self.caches.sensitivity().get_or_compute(&input, || {
            sensitivity_analysis(base, variables, range_percent, model)
        })
    }
}
