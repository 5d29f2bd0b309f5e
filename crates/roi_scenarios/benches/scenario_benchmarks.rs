//! Criterion benchmarks for the scenario engine.
//!
//! - Monte Carlo: sequential vs distributed at several iteration counts
//! - Correlated sampling overhead
//! - IRR on monthly investment flows

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use roi_core::config::SimulationSettings;
use roi_core::math::correlation::CorrelationMatrix;
use roi_core::types::{CashFlowSeries, Distribution, ScenarioDefinition, Variable};
use roi_models::calculator::irr;
use roi_scenarios::model::{FnModel, Sample};
use roi_scenarios::MonteCarloSimulator;

fn scenario(iterations: usize) -> ScenarioDefinition {
    ScenarioDefinition::new(
        "bench",
        vec![
            Variable::new("revenue", Distribution::Normal { mean: 1.0e6, std_dev: 1.5e5 }),
            Variable::new("margin", Distribution::Uniform { low: 0.1, high: 0.3 }),
            Variable::new(
                "cost",
                Distribution::Triangular {
                    low: 5.0e4,
                    mode: 8.0e4,
                    high: 1.5e5,
                },
            ),
        ],
        iterations,
    )
    .unwrap()
    .with_seed(42)
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    let model = FnModel::new("profit", |s: &Sample<'_>| {
        s.get_or("revenue", 0.0) * s.get_or("margin", 0.0) - s.get_or("cost", 0.0)
    });
    let sequential = MonteCarloSimulator::new(SimulationSettings {
        parallel_threshold: usize::MAX,
        ..SimulationSettings::default()
    });
    let parallel = MonteCarloSimulator::new(SimulationSettings {
        parallel_threshold: 0,
        ..SimulationSettings::default()
    });

    for n in [2_000, 20_000, 200_000] {
        let def = scenario(n);
        group.bench_with_input(BenchmarkId::new("sequential", n), &def, |b, def| {
            b.iter(|| sequential.run(black_box(def), &model));
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &def, |b, def| {
            b.iter(|| parallel.run(black_box(def), &model));
        });
    }
    group.finish();
}

fn bench_correlated_sampling(c: &mut Criterion) {
    let model = FnModel::new("sum", |s: &Sample<'_>| s.values().iter().sum());
    let matrix = CorrelationMatrix::new(
        &[1.0, 0.5, -0.2, 0.5, 1.0, 0.1, -0.2, 0.1, 1.0],
        3,
    )
    .unwrap();
    let correlated = scenario(20_000).with_correlation(matrix).unwrap();
    let sim = MonteCarloSimulator::default();

    c.bench_function("correlated_20k", |b| {
        b.iter(|| sim.run(black_box(&correlated), &model));
    });
}

fn bench_irr(c: &mut Criterion) {
    let mut group = c.benchmark_group("irr");
    for months in [12, 60, 120] {
        let mut values = vec![-250_000.0];
        values.extend(std::iter::repeat(9_000.0).take(months));
        let flows = CashFlowSeries::new(values).unwrap();
        group.bench_with_input(BenchmarkId::new("monthly", months), &flows, |b, flows| {
            b.iter(|| irr(black_box(flows)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_monte_carlo,
    bench_correlated_sampling,
    bench_irr
);
criterion_main!(benches);
