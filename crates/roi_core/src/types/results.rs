//! Immutable outputs of scenario operations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Percentile levels reported by every simulation, as fractions.
pub const PERCENTILE_LADDER: [f64; 7] = [0.05, 0.10, 0.25, 0.50, 0.75, 0.90, 0.95];

/// Why a simulation stopped before its requested iteration count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialReason {
    /// The wall-clock budget elapsed.
    Timeout,
    /// The soft iteration cap was lower than the requested count.
    IterationCap,
}

/// Whether a simulation ran to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completion {
    /// Every requested iteration ran.
    Complete,
    /// Only some iterations ran; statistics cover those.
    Partial {
        /// What stopped the run
        reason: PartialReason,
        /// Iterations originally requested
        requested: usize,
    },
}

/// One rung of the percentile ladder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    /// Level as a fraction in `[0, 1]`
    pub level: f64,
    /// Outcome value at that level
    pub value: f64,
}

/// Distribution summary of a Monte Carlo run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Sample mean
    pub mean: f64,
    /// Sample standard deviation (`n - 1`)
    pub std_dev: f64,
    /// Smallest outcome
    pub min: f64,
    /// Largest outcome
    pub max: f64,
    /// Ladder at [`PERCENTILE_LADDER`] levels, ascending
    pub percentiles: Vec<Percentile>,
    /// Iterations whose outcome contributed to the statistics
    pub iterations_completed: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
    /// Complete or partial
    pub completion: Completion,
}

impl SimulationResult {
    /// Returns `true` when the run stopped early.
    pub fn is_partial(&self) -> bool {
        matches!(self.completion, Completion::Partial { .. })
    }

    /// Value at `level` if it is on the ladder.
    pub fn percentile(&self, level: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| (p.level - level).abs() < 1e-9)
            .map(|p| p.value)
    }

    /// 5th percentile.
    pub fn p5(&self) -> f64 {
        self.percentile(0.05).unwrap_or(f64::NAN)
    }

    /// Median.
    pub fn p50(&self) -> f64 {
        self.percentile(0.50).unwrap_or(f64::NAN)
    }

    /// 95th percentile.
    pub fn p95(&self) -> f64 {
        self.percentile(0.95).unwrap_or(f64::NAN)
    }

    /// Standard error of the mean.
    pub fn std_error(&self) -> f64 {
        if self.iterations_completed == 0 {
            return f64::NAN;
        }
        self.std_dev / (self.iterations_completed as f64).sqrt()
    }

    /// Normal-approximation 95% confidence interval for the mean.
    pub fn confidence_interval_95(&self) -> (f64, f64) {
        let half = 1.959_963_985 * self.std_error();
        (self.mean - half, self.mean + half)
    }
}

/// Effect of perturbing one variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    /// Variable name
    pub variable: String,
    /// Unperturbed input
    pub base_value: f64,
    /// Input at `base * (1 - p)`
    pub low_value: f64,
    /// Input at `base * (1 + p)`
    pub high_value: f64,
    /// Output with the low input
    pub low_output: f64,
    /// Output with the high input
    pub high_output: f64,
    /// `%` output change per `%` input change
    pub elasticity: f64,
    /// `high_output - low_output`, the tornado bar width
    pub swing: f64,
}

/// Per-variable elasticities in tornado order (descending `|elasticity|`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    /// Output at the base case
    pub base_output: f64,
    /// Perturbation in percent (10.0 = ±10%)
    pub range_percent: f64,
    /// Ranked entries
    pub entries: Vec<SensitivityEntry>,
}

impl SensitivityResult {
    /// Elasticity of `variable`, if it was analysed.
    pub fn elasticity(&self, variable: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.variable == variable)
            .map(|e| e.elasticity)
    }

    /// The `n` most influential entries.
    pub fn top(&self, n: usize) -> &[SensitivityEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Variable names in tornado order.
    pub fn ranking(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.variable.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result(completion: Completion) -> SimulationResult {
        SimulationResult {
            mean: 100.0,
            std_dev: 20.0,
            min: 40.0,
            max: 160.0,
            percentiles: PERCENTILE_LADDER
                .iter()
                .map(|&level| Percentile {
                    level,
                    value: 100.0 + (level - 0.5) * 100.0,
                })
                .collect(),
            iterations_completed: 400,
            elapsed: Duration::from_millis(3),
            completion,
        }
    }

    #[test]
    fn test_percentile_helpers() {
        let r = result(Completion::Complete);
        assert_relative_eq!(r.p5(), 55.0, epsilon = 1e-9);
        assert_relative_eq!(r.p50(), 100.0);
        assert_relative_eq!(r.p95(), 145.0, epsilon = 1e-9);
        assert!(r.percentile(0.33).is_none());
    }

    #[test]
    fn test_std_error_and_interval() {
        let r = result(Completion::Complete);
        assert_relative_eq!(r.std_error(), 1.0);
        let (lo, hi) = r.confidence_interval_95();
        assert!(lo < 100.0 && hi > 100.0);
        assert_relative_eq!(hi - lo, 2.0 * 1.959_963_985, epsilon = 1e-9);
    }

    #[test]
    fn test_partial_flag() {
        assert!(!result(Completion::Complete).is_partial());
        let partial = result(Completion::Partial {
            reason: PartialReason::Timeout,
            requested: 1_000,
        });
        assert!(partial.is_partial());
    }

    #[test]
    fn test_sensitivity_lookup() {
        let entry = |name: &str, e: f64| SensitivityEntry {
            variable: name.to_string(),
            base_value: 1.0,
            low_value: 0.9,
            high_value: 1.1,
            low_output: 0.0,
            high_output: 0.0,
            elasticity: e,
            swing: 0.0,
        };
        let s = SensitivityResult {
            base_output: 10.0,
            range_percent: 10.0,
            entries: vec![entry("price", 2.0), entry("cost", -0.5)],
        };
        assert_eq!(s.elasticity("cost"), Some(-0.5));
        assert_eq!(s.top(5).len(), 2);
        assert_eq!(s.ranking(), vec!["price", "cost"]);
    }
}
