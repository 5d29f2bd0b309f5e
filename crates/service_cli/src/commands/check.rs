//! Check command: show the effective configuration.

use roi_core::config::EngineConfig;
use roi_models::industry::Industry;
use roi_scenarios::AnalysisEngine;

use crate::output::{emit, percent, Format, Table};
use crate::Result;

/// Run the check command
pub fn run(engine: &AnalysisEngine, format: Format) -> Result<()> {
    let config: &EngineConfig = engine.config();
    emit(format, config, || {
        let sim = &config.simulation;
        let mut table = Table::new("Configuration OK")
            .row("Version", env!("CARGO_PKG_VERSION"))
            .row("Available CPUs", num_cpus::get().to_string())
            .row("Max workers", sim.max_workers.to_string())
            .row("Parallel threshold", sim.parallel_threshold.to_string())
            .row("Chunk size", sim.chunk_size.to_string())
            .row("Default seed", sim.default_seed.to_string())
            .row(
                "Timeout",
                sim.timeout_ms.map_or_else(|| "none".to_string(), |ms| format!("{ms} ms")),
            )
            .row(
                "IRR bracket",
                format!("[{}, {}]", config.solver.lower, config.solver.upper),
            );
        for (kind, policy) in [
            ("npv", config.cache.npv),
            ("irr", config.cache.irr),
            ("monte_carlo", config.cache.monte_carlo),
            ("sensitivity", config.cache.sensitivity),
        ] {
            table = table.row(
                format!("Cache {kind}"),
                format!("{} entries, {} s", policy.capacity, policy.ttl_secs),
            );
        }
        for industry in Industry::ALL {
            let b = engine.registry().benchmark(industry);
            table = table.row(
                format!("Benchmark {industry}"),
                format!(
                    "gain {}  premium {}",
                    percent(b.productivity_gain_rate),
                    percent(b.risk_premium)
                ),
            );
        }
        table
    })
}
