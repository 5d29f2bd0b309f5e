//! Simulate command: Monte Carlo over the job's scenario.

use std::thread;

use roi_scenarios::{AnalysisEngine, ChunkProgress, InvestmentNpvModel};
use tracing::{debug, info};

use crate::config::JobFile;
use crate::output::{emit, money, Format, Table};
use crate::Result;

/// Overrides from the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulateOptions {
    /// Replace the scenario's iteration count
    pub iterations: Option<usize>,
    /// Replace the scenario's seed
    pub seed: Option<u64>,
    /// Log chunk completions
    pub progress: bool,
}

/// Run the simulate command
pub fn run(
    engine: AnalysisEngine,
    input: &str,
    options: SimulateOptions,
    format: Format,
) -> Result<()> {
    let job = JobFile::load(input)?;
    let mut scenario = job.require_scenario()?.clone();
    if let Some(iterations) = options.iterations {
        scenario.iterations = iterations;
    }
    if let Some(seed) = options.seed {
        scenario.seed = Some(seed);
    }
    scenario.validate()?;

    let profile = engine
        .registry()
        .profile(job.investment.industry(), job.investment.company_size());
    let model = InvestmentNpvModel::new(job.investment.clone(), profile);
    info!(
        scenario = %scenario.name,
        iterations = scenario.iterations,
        variables = scenario.variables.len(),
        "Starting simulation"
    );

    let (engine, observer) = if options.progress {
        let (tx, rx) = crossbeam_channel::unbounded::<ChunkProgress>();
        let observer = thread::spawn(move || {
            for event in rx {
                info!(
                    "Chunk {}/{} done ({} iterations)",
                    event.completed_chunks, event.total_chunks, event.iterations
                );
            }
        });
        (engine.with_progress(tx), Some(observer))
    } else {
        (engine, None)
    };

    let result = engine.monte_carlo(&scenario, &model);
    drop(engine);
    if let Some(observer) = observer {
        if observer.join().is_err() {
            debug!("Progress observer panicked");
        }
    }
    let result = result?;

    emit(format, &result, || {
        let mut table = Table::new(format!("NPV distribution: {}", scenario.name))
            .row("Mean", money(result.mean))
            .row("Std dev", money(result.std_dev))
            .row("Min", money(result.min))
            .row("Max", money(result.max));
        for p in &result.percentiles {
            table = table.row(format!("P{:.0}", p.level * 100.0), money(p.value));
        }
        let (lo, hi) = result.confidence_interval_95();
        table
            .row("95% CI of mean", format!("{} .. {}", money(lo), money(hi)))
            .row(
                "Iterations",
                format!(
                    "{}{}",
                    result.iterations_completed,
                    if result.is_partial() { " (partial)" } else { "" }
                ),
            )
            .row("Elapsed", format!("{:.1?}", result.elapsed))
    })
}
