//! ROI CLI - Command Line Front End for the Scenario Engine
//!
//! # Commands
//!
//! - `roi analyze --input job.toml` - Deterministic metrics for an investment
//! - `roi simulate --input job.toml` - Monte Carlo NPV distribution
//! - `roi sensitivity --input job.toml` - Tornado ranking of the drivers
//! - `roi check` - Show the effective configuration
//!
//! # Architecture
//!
//! As the **S**ervice layer this crate wires configuration, the industry
//! registry and the cache into one `AnalysisEngine` and renders results.
//! Logs go to stderr so JSON output on stdout stays machine-readable.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use roi_cache::CacheManager;
use roi_scenarios::AnalysisEngine;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use error::{CliError, Result};
use output::Format;

/// ROI scenario and risk analysis CLI
#[derive(Parser)]
#[command(name = "roi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: String,

    /// Industry benchmark overrides (TOML)
    #[arg(long, global = true)]
    industries: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Table)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute NPV, IRR, payback, TCO and risk-adjusted return
    Analyze {
        /// Job file (TOML) with an [investment] section
        #[arg(short, long)]
        input: String,
    },

    /// Run a Monte Carlo simulation of the investment's NPV
    Simulate {
        /// Job file (TOML) with [investment] and [scenario] sections
        #[arg(short, long)]
        input: String,

        /// Override the scenario's iteration count
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Override the scenario's seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Log chunk completions while running
        #[arg(long)]
        progress: bool,
    },

    /// Rank investment drivers by NPV elasticity
    Sensitivity {
        /// Job file (TOML) with an [investment] section
        #[arg(short, long)]
        input: String,

        /// Perturbation in percent (default from configuration)
        #[arg(short, long)]
        range: Option<f64>,
    },

    /// Check configuration and show effective settings
    Check,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let engine_config = config::load_engine_config(&cli.config)?;
    let registry = config::load_registry(cli.industries.as_deref())?;
    let caches = Arc::new(CacheManager::new(&engine_config.cache));
    let engine = AnalysisEngine::new(engine_config, caches.clone(), Arc::new(registry));

    let outcome = match cli.command {
        Commands::Analyze { input } => commands::analyze::run(&engine, &input, cli.format),
        Commands::Simulate {
            input,
            iterations,
            seed,
            progress,
        } => commands::simulate::run(
            engine,
            &input,
            commands::simulate::SimulateOptions {
                iterations,
                seed,
                progress,
            },
            cli.format,
        ),
        Commands::Sensitivity { input, range } => {
            commands::sensitivity::run(&engine, &input, range, cli.format)
        }
        Commands::Check => commands::check::run(&engine, cli.format),
    };

    debug!(stats = ?caches.report(), "Cache statistics");
    outcome
}
