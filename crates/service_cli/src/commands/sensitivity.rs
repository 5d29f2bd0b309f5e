//! Sensitivity command: tornado ranking of the investment drivers.

use roi_scenarios::{AnalysisEngine, BaseCase, InvestmentNpvModel};
use tracing::{info, warn};

use crate::config::JobFile;
use crate::output::{emit, money, Format, Table};
use crate::Result;

/// Run the sensitivity command
pub fn run(
    engine: &AnalysisEngine,
    input: &str,
    range_percent: Option<f64>,
    format: Format,
) -> Result<()> {
    let job = JobFile::load(input)?;
    let profile = engine
        .registry()
        .profile(job.investment.industry(), job.investment.company_size());
    let model = InvestmentNpvModel::new(job.investment.clone(), profile);

    // drivers at zero cannot be perturbed relatively
    let (kept, skipped): (Vec<_>, Vec<_>) = model
        .base_values()
        .into_iter()
        .partition(|(_, value)| *value != 0.0);
    for (name, _) in &skipped {
        if job.sensitivity.variables.iter().any(|v| v == name) {
            warn!(variable = name, "Driver is zero at the base case, skipped");
        }
    }
    let base = BaseCase::new(kept)?;
    let variables: Vec<String> = job
        .sensitivity
        .variables
        .iter()
        .filter(|v| base.get(v).is_some())
        .cloned()
        .collect();
    let range = range_percent.or(job.sensitivity.range_percent);
    info!(drivers = base.names().len(), "Running sensitivity analysis");

    let result = engine.sensitivity(&base, &variables, range, &model)?;
    emit(format, &result, || {
        let mut table = Table::new(format!(
            "Tornado (±{}%, base NPV {})",
            result.range_percent,
            money(result.base_output)
        ));
        for entry in &result.entries {
            table = table.row(
                entry.variable.clone(),
                format!(
                    "elasticity {:+.3}  swing {}",
                    entry.elasticity,
                    money(entry.swing)
                ),
            );
        }
        table
    })
}
