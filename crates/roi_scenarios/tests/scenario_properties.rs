//! End-to-end properties of the scenario engine.

use std::sync::Arc;

use approx::assert_relative_eq;
use roi_cache::CacheManager;
use roi_core::config::{EngineConfig, SimulationSettings};
use roi_core::types::{CashFlowSeries, Distribution, ScenarioDefinition, Variable};
use roi_models::industry::{CompanySize, Industry, IndustryRegistry};
use roi_models::investment::InvestmentParameters;
use roi_scenarios::model::{FnModel, InvestmentNpvModel, Sample};
use roi_scenarios::sensitivity::BaseCase;
use roi_scenarios::{AnalysisEngine, MonteCarloSimulator};

fn linear_scenario(iterations: usize) -> ScenarioDefinition {
    ScenarioDefinition::new(
        "linear",
        vec![Variable::new(
            "x",
            Distribution::Normal {
                mean: 50.0,
                std_dev: 8.0,
            },
        )],
        iterations,
    )
    .unwrap()
    .with_seed(17)
}

fn linear_model() -> FnModel<impl Fn(&Sample<'_>) -> f64 + Sync> {
    FnModel::new("3x_plus_2", |s: &Sample<'_>| 3.0 * s.get_or("x", 0.0) + 2.0)
}

fn fresh_engine() -> AnalysisEngine {
    let config = EngineConfig::default();
    let caches = Arc::new(CacheManager::new(&config.cache));
    AnalysisEngine::new(config, caches, Arc::new(IndustryRegistry::builtin()))
}

#[test]
fn monte_carlo_converges_as_iterations_grow() {
    let sim = MonteCarloSimulator::default();
    let model = linear_model();
    let runs: Vec<_> = [1_000, 10_000, 100_000]
        .iter()
        .map(|&n| sim.run(&linear_scenario(n), &model).unwrap())
        .collect();

    // standard error shrinks with the iteration count
    assert!(runs[0].std_error() > runs[1].std_error());
    assert!(runs[1].std_error() > runs[2].std_error());

    // and the estimates settle on the analytic moments (152, 24)
    for run in &runs {
        let tolerance = 5.0 * run.std_error();
        assert!((run.mean - 152.0).abs() < tolerance, "mean {}", run.mean);
    }
    assert_relative_eq!(runs[2].std_dev, 24.0, max_relative = 0.01);
    let (lo, hi) = runs[2].confidence_interval_95();
    assert!(lo < 152.0 && 152.0 < hi);
}

#[test]
fn parallel_and_sequential_means_agree() {
    let model = linear_model();
    let scenario = linear_scenario(50_000);
    let sequential = MonteCarloSimulator::new(SimulationSettings {
        parallel_threshold: usize::MAX,
        ..SimulationSettings::default()
    })
    .run(&scenario, &model)
    .unwrap();
    let parallel = MonteCarloSimulator::new(SimulationSettings {
        parallel_threshold: 0,
        max_workers: 8,
        ..SimulationSettings::default()
    })
    .run(&scenario, &model)
    .unwrap();

    assert!((sequential.mean - parallel.mean).abs() <= 3.0 * sequential.std_error());
    // fixed chunk layout makes them identical, not merely close
    assert_eq!(sequential.mean.to_bits(), parallel.mean.to_bits());
    assert_eq!(sequential.percentiles, parallel.percentiles);
}

#[test]
fn cache_idempotence_through_facade() {
    let engine = fresh_engine();
    let flows = CashFlowSeries::new(vec![-1000.0, 300.0, 300.0, 300.0, 300.0, 300.0]).unwrap();

    let first = engine.npv(&flows, 0.10).unwrap();
    let second = engine.npv(&flows, 0.10).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
    assert!((first - 137.24).abs() < 0.01);

    let model = linear_model();
    let a = engine.monte_carlo(&linear_scenario(5_000), &model).unwrap();
    let b = engine.monte_carlo(&linear_scenario(5_000), &model).unwrap();
    assert_eq!(a, b);

    let report = engine.caches().report();
    assert_eq!(report.npv.hits, 1);
    assert_eq!(report.monte_carlo.hits, 1);
    assert_eq!(report.monte_carlo.misses, 1);
}

#[test]
fn isolated_engines_do_not_share_state() {
    let a = fresh_engine();
    let b = fresh_engine();
    let flows = CashFlowSeries::new(vec![-1000.0, 1100.0]).unwrap();
    a.irr(&flows).unwrap();
    b.irr(&flows).unwrap();
    assert_eq!(a.caches().report().irr.hits, 0);
    assert_eq!(b.caches().report().irr.hits, 0);
}

#[test]
fn investment_model_drives_simulation_and_tornado() {
    let params = InvestmentParameters::builder()
        .annual_revenue(3_000_000.0)
        .initial_investment(200_000.0)
        .annual_costs(36_000.0)
        .cost_escalation_rate(0.03)
        .discount_rate(0.10)
        .timeline_periods(36)
        .industry(Industry::Manufacturing)
        .company_size(CompanySize::Large)
        .build()
        .unwrap();
    let profile = IndustryRegistry::builtin().profile(Industry::Manufacturing, CompanySize::Large);
    let model = InvestmentNpvModel::new(params, profile.clone());

    let scenario = ScenarioDefinition::new(
        "manufacturing_rollout",
        vec![
            Variable::new(
                "productivity_gain_rate",
                Distribution::Triangular {
                    low: profile.productivity_gain_rate * 0.5,
                    mode: profile.productivity_gain_rate,
                    high: profile.productivity_gain_rate * 1.2,
                },
            ),
            Variable::new(
                "annual_costs",
                Distribution::Uniform {
                    low: 30_000.0,
                    high: 60_000.0,
                },
            ),
        ],
        3_000,
    )
    .unwrap()
    .with_seed(1);

    let engine = fresh_engine();
    let result = engine.monte_carlo(&scenario, &model).unwrap();
    assert!(result.p5() < result.p50() && result.p50() < result.p95());
    assert!(result.mean > 0.0);

    let base = BaseCase::new(model.base_values()).unwrap();
    let tornado = engine.sensitivity(&base, &[], None, &model).unwrap();
    assert_eq!(tornado.entries.len(), 6);
    // revenue and gain rate enter the benefit symmetrically
    assert_relative_eq!(
        tornado.elasticity("annual_revenue").unwrap(),
        tornado.elasticity("productivity_gain_rate").unwrap(),
        max_relative = 1e-9
    );
    assert!(tornado.elasticity("initial_investment").unwrap() < 0.0);
}
