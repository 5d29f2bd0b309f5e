//! Analyze command: deterministic metrics for one investment.

use roi_scenarios::AnalysisEngine;
use tracing::info;

use crate::config::JobFile;
use crate::output::{emit, money, months, percent, Format, Table};
use crate::Result;

/// Run the analyze command
pub fn run(engine: &AnalysisEngine, input: &str, format: Format) -> Result<()> {
    let job = JobFile::load(input)?;
    let params = &job.investment;
    info!(
        industry = %params.industry(),
        company_size = %params.company_size(),
        periods = params.timeline_periods(),
        "Analysing investment"
    );

    let metrics = engine.analyze(params, job.risk_free_rate)?;
    emit(format, &metrics, || {
        Table::new(format!("{} / {}", params.industry(), params.company_size()))
            .row("NPV", money(metrics.npv))
            .row(
                "IRR (annualised)",
                metrics.irr_annualised.map_or_else(|| "undefined".to_string(), percent),
            )
            .row("ROI", percent(metrics.roi))
            .row("TCO", money(metrics.tco))
            .row("Payback", months(metrics.payback_months))
            .row("Discounted payback", months(metrics.discounted_payback_months))
            .row("Risk level", metrics.risk_level.to_string())
            .row("Risk-adjusted return", percent(metrics.risk_adjusted_return))
            .row("Annual benefit", money(metrics.annual_benefit))
    })
}
