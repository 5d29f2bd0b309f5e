//! Monte Carlo simulation over a [`ScenarioDefinition`].
//!
//! Runs at or below `parallel_threshold` iterations execute on the calling
//! thread; larger runs go through the [`ExecutionCoordinator`]. Both paths
//! share the same chunk layout and seeding, so the dispatch decision never
//! changes the numbers.

use crossbeam_channel::Sender;
use roi_core::config::SimulationSettings;
use roi_core::types::{EngineError, ScenarioDefinition, SimulationResult};
use tracing::debug;

use crate::coordinator::{Chunk, ChunkProgress, CoordinatorConfig, ExecutionCoordinator, PartialStats};
use crate::model::{OutcomeModel, Sample};
use crate::rng::EngineRng;
use crate::sampling::ScenarioSampler;

/// Monte Carlo driver.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloSimulator {
    settings: SimulationSettings,
    progress: Option<Sender<ChunkProgress>>,
}

impl MonteCarloSimulator {
    /// Simulator with `settings`.
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            progress: None,
        }
    }

    /// Forward chunk-completion events to `sender` on parallel runs.
    pub fn with_progress(mut self, sender: Sender<ChunkProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Settings in force.
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Seed a run of `definition` will use.
    pub fn effective_seed(&self, definition: &ScenarioDefinition) -> u64 {
        definition.seed.unwrap_or(self.settings.default_seed)
    }

    /// Whether `iterations` is large enough to distribute.
    pub fn is_parallel(&self, iterations: usize) -> bool {
        iterations > self.settings.parallel_threshold
    }

    /// Simulate `definition`, evaluating `model` once per draw.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] if the scenario is invalid
    /// - [`EngineError::NonFiniteOutcome`] if the model returns NaN or
    ///   infinity for any draw
    /// - [`EngineError::InsufficientData`] if a timeout expires before any
    ///   iteration completes
    pub fn run(
        &self,
        definition: &ScenarioDefinition,
        model: &dyn OutcomeModel,
    ) -> Result<SimulationResult, EngineError> {
        let sampler = ScenarioSampler::new(definition)?;
        let names = definition.variable_names();
        let seed = self.effective_seed(definition);

        let mut coordinator = ExecutionCoordinator::new(CoordinatorConfig::from(&self.settings));
        let workers = if self.is_parallel(definition.iterations) {
            if let Some(tx) = &self.progress {
                coordinator = coordinator.with_progress(tx.clone());
            }
            None
        } else {
            Some(1)
        };
        debug!(
            scenario = %definition.name,
            model = model.model_id(),
            iterations = definition.iterations,
            seed,
            parallel = workers.is_none(),
            correlated = sampler.is_correlated(),
            "Running Monte Carlo"
        );

        coordinator.run_distributed(definition.iterations, workers, seed, |chunk: &Chunk| {
            let mut rng = EngineRng::from_seed(chunk.seed);
            let mut draw = vec![0.0; sampler.dim()];
            let mut stats = PartialStats::with_capacity(chunk.len());
            for _ in chunk.iterations.clone() {
                sampler.draw(&mut rng, &mut draw);
                stats.push(model.evaluate(&Sample::from_parts(&names, &draw)));
            }
            stats
        })
    }
}

/// One-shot Monte Carlo with `settings`.
///
/// ```
/// use roi_core::config::SimulationSettings;
/// use roi_core::types::{Distribution, ScenarioDefinition, Variable};
/// use roi_scenarios::model::{FnModel, Sample};
/// use roi_scenarios::monte_carlo::monte_carlo;
///
/// let scenario = ScenarioDefinition::new(
///     "savings",
///     vec![Variable::new("hours", Distribution::Normal { mean: 100.0, std_dev: 10.0 })],
///     5_000,
/// ).unwrap().with_seed(9);
/// let model = FnModel::new("rate_50", |s: &Sample<'_>| 50.0 * s.get_or("hours", 0.0));
///
/// let result = monte_carlo(&scenario, &model, &SimulationSettings::default()).unwrap();
/// assert!((result.mean - 5_000.0).abs() < 50.0);
/// assert!(!result.is_partial());
/// ```
pub fn monte_carlo(
    definition: &ScenarioDefinition,
    model: &dyn OutcomeModel,
    settings: &SimulationSettings,
) -> Result<SimulationResult, EngineError> {
    MonteCarloSimulator::new(settings.clone()).run(definition, model)
}
