//! Drawing scenario variables.
//!
//! Independent variables are sampled directly with `rand_distr`. When the
//! scenario carries a correlation matrix, a Gaussian copula is used: one
//! standard normal per variable, correlated through the Cholesky factor,
//! then mapped onto each marginal by [`Distribution::from_standard_normal`].

use rand_distr::{Normal, Triangular, Uniform};
use roi_core::math::correlation::CholeskyFactor;
use roi_core::types::{Distribution, EngineError, ScenarioDefinition};

use crate::rng::EngineRng;

#[derive(Clone, Debug)]
enum Marginal {
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
    Triangular(Triangular<f64>),
}

impl Marginal {
    fn from_distribution(name: &str, distribution: &Distribution) -> Result<Self, EngineError> {
        distribution.validate(name)?;
        match *distribution {
            Distribution::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map(Marginal::Normal)
                .map_err(|e| EngineError::invalid(name, e.to_string())),
            Distribution::Uniform { low, high } => Ok(Marginal::Uniform(Uniform::new(low, high))),
            Distribution::Triangular { low, mode, high } => Triangular::new(low, high, mode)
                .map(Marginal::Triangular)
                .map_err(|e| EngineError::invalid(name, e.to_string())),
        }
    }

    #[inline]
    fn draw(&self, rng: &mut EngineRng) -> f64 {
        match self {
            Marginal::Normal(d) => rng.sample(d),
            Marginal::Uniform(d) => rng.sample(d),
            Marginal::Triangular(d) => rng.sample(d),
        }
    }
}

/// Prepared sampler for one scenario.
///
/// Building it validates the scenario once; drawing is allocation-free.
///
/// ```
/// use roi_core::types::{Distribution, ScenarioDefinition, Variable};
/// use roi_scenarios::rng::EngineRng;
/// use roi_scenarios::sampling::ScenarioSampler;
///
/// let scenario = ScenarioDefinition::new(
///     "demo",
///     vec![Variable::new("x", Distribution::Uniform { low: 1.0, high: 2.0 })],
///     10,
/// ).unwrap();
/// let sampler = ScenarioSampler::new(&scenario).unwrap();
/// let mut rng = EngineRng::from_seed(1);
/// let mut out = vec![0.0; sampler.dim()];
/// sampler.draw(&mut rng, &mut out);
/// assert!((1.0..2.0).contains(&out[0]));
/// ```
#[derive(Clone, Debug)]
pub struct ScenarioSampler {
    marginals: Vec<Marginal>,
    distributions: Vec<Distribution>,
    cholesky: Option<CholeskyFactor>,
}

impl ScenarioSampler {
    /// Sampler for `scenario`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidInput`] if the scenario fails validation.
    pub fn new(scenario: &ScenarioDefinition) -> Result<Self, EngineError> {
        scenario.validate()?;
        let marginals = scenario
            .variables
            .iter()
            .map(|v| Marginal::from_distribution(&v.name, &v.distribution))
            .collect::<Result<Vec<_>, _>>()?;
        let cholesky = match &scenario.correlation {
            Some(matrix) => Some(matrix.cholesky()?),
            None => None,
        };
        Ok(Self {
            marginals,
            distributions: scenario
                .variables
                .iter()
                .map(|v| v.distribution.clone())
                .collect(),
            cholesky,
        })
    }

    /// Number of variables per draw.
    pub fn dim(&self) -> usize {
        self.marginals.len()
    }

    /// Whether draws go through the copula.
    pub fn is_correlated(&self) -> bool {
        self.cholesky.is_some()
    }

    /// Draw one joint sample into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() < self.dim()`.
    pub fn draw(&self, rng: &mut EngineRng, out: &mut [f64]) {
        match &self.cholesky {
            None => {
                for (slot, marginal) in out.iter_mut().zip(&self.marginals) {
                    *slot = marginal.draw(rng);
                }
            }
            Some(factor) => {
                let n = self.dim();
                // stack buffer for typical scenario sizes
                let mut z_stack = [0.0_f64; 16];
                let mut z_heap: Vec<f64>;
                let z: &mut [f64] = if n <= z_stack.len() {
                    &mut z_stack[..n]
                } else {
                    z_heap = vec![0.0; n];
                    &mut z_heap
                };
                rng.fill_normal(z);
                factor.transform_into(z, out);
                for (slot, distribution) in out.iter_mut().zip(&self.distributions) {
                    *slot = distribution.from_standard_normal(*slot);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_core::math::correlation::CorrelationMatrix;
    use roi_core::math::statistics::pearson;
    use roi_core::types::Variable;

    fn scenario(correlation: Option<f64>) -> ScenarioDefinition {
        let s = ScenarioDefinition::new(
            "pair",
            vec![
                Variable::new("a", Distribution::Normal { mean: 0.0, std_dev: 1.0 }),
                Variable::new(
                    "b",
                    Distribution::Triangular {
                        low: 0.0,
                        mode: 2.0,
                        high: 10.0,
                    },
                ),
            ],
            100,
        )
        .unwrap();
        match correlation {
            Some(rho) => s
                .with_correlation(CorrelationMatrix::new(&[1.0, rho, rho, 1.0], 2).unwrap())
                .unwrap(),
            None => s,
        }
    }

    fn draws(sampler: &ScenarioSampler, n: usize) -> (Vec<f64>, Vec<f64>) {
        let mut rng = EngineRng::from_seed(11);
        let mut out = [0.0; 2];
        let mut a = Vec::with_capacity(n);
        let mut b = Vec::with_capacity(n);
        for _ in 0..n {
            sampler.draw(&mut rng, &mut out);
            a.push(out[0]);
            b.push(out[1]);
        }
        (a, b)
    }

    #[test]
    fn test_independent_draws_respect_bounds() {
        let sampler = ScenarioSampler::new(&scenario(None)).unwrap();
        assert!(!sampler.is_correlated());
        let (_, b) = draws(&sampler, 5_000);
        assert!(b.iter().all(|x| (0.0..=10.0).contains(x)));
        let mean = b.iter().sum::<f64>() / b.len() as f64;
        assert!((mean - 4.0).abs() < 0.15);
    }

    #[test]
    fn test_copula_induces_correlation() {
        let sampler = ScenarioSampler::new(&scenario(Some(0.8))).unwrap();
        assert!(sampler.is_correlated());
        let (a, b) = draws(&sampler, 20_000);
        let rho = pearson(&a, &b).unwrap();
        assert!(rho > 0.7, "rho = {rho}");
        assert!(b.iter().all(|x| (0.0..=10.0).contains(x)));
    }

    #[test]
    fn test_independent_draws_uncorrelated() {
        let sampler = ScenarioSampler::new(&scenario(None)).unwrap();
        let (a, b) = draws(&sampler, 20_000);
        assert!(pearson(&a, &b).unwrap().abs() < 0.05);
    }

    #[test]
    fn test_zero_std_dev_is_constant() {
        let s = ScenarioDefinition::new(
            "fixed",
            vec![Variable::new("k", Distribution::Normal { mean: 3.0, std_dev: 0.0 })],
            1,
        )
        .unwrap();
        let sampler = ScenarioSampler::new(&s).unwrap();
        let mut out = [0.0];
        sampler.draw(&mut EngineRng::from_seed(5), &mut out);
        assert_eq!(out[0], 3.0);
    }
}
