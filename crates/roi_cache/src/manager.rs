//! Per-calculation-kind cache bundle.

use std::sync::Arc;

use roi_core::config::CacheSettings;
use roi_core::types::{SensitivityResult, SimulationResult};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::key::CalculationKind;
use crate::store::{CacheStats, TtlLruCache};

/// Counter snapshots for every cache in a [`CacheManager`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheReport {
    /// NPV cache
    pub npv: CacheStats,
    /// IRR cache
    pub irr: CacheStats,
    /// Monte Carlo cache
    pub monte_carlo: CacheStats,
    /// Sensitivity cache
    pub sensitivity: CacheStats,
}

/// One cache per calculation kind, each with its own capacity and TTL.
///
/// Passed explicitly (usually as `Arc<CacheManager>`) to whatever needs
/// it; there is no process-wide instance. Tests build a fresh manager
/// each time.
///
/// ```
/// use roi_cache::CacheManager;
/// use roi_core::config::CacheSettings;
///
/// let caches = CacheManager::new(&CacheSettings::default());
/// assert_eq!(caches.monte_carlo().capacity(), 64);
/// assert_eq!(caches.npv().default_ttl().as_secs(), 1800);
/// ```
#[derive(Debug)]
pub struct CacheManager {
    npv: TtlLruCache<f64>,
    irr: TtlLruCache<f64>,
    monte_carlo: TtlLruCache<SimulationResult>,
    sensitivity: TtlLruCache<SensitivityResult>,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(&CacheSettings::default())
    }
}

impl CacheManager {
    /// Caches sized by `settings`, timed by the system clock.
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Caches sized by `settings` sharing `clock`.
    pub fn with_clock(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            npv: TtlLruCache::with_clock(CalculationKind::Npv, settings.npv, clock.clone()),
            irr: TtlLruCache::with_clock(CalculationKind::Irr, settings.irr, clock.clone()),
            monte_carlo: TtlLruCache::with_clock(
                CalculationKind::MonteCarlo,
                settings.monte_carlo,
                clock.clone(),
            ),
            sensitivity: TtlLruCache::with_clock(
                CalculationKind::Sensitivity,
                settings.sensitivity,
                clock,
            ),
        }
    }

    /// NPV results.
    pub fn npv(&self) -> &TtlLruCache<f64> {
        &self.npv
    }

    /// IRR results.
    pub fn irr(&self) -> &TtlLruCache<f64> {
        &self.irr
    }

    /// Monte Carlo results.
    pub fn monte_carlo(&self) -> &TtlLruCache<SimulationResult> {
        &self.monte_carlo
    }

    /// Sensitivity results.
    pub fn sensitivity(&self) -> &TtlLruCache<SensitivityResult> {
        &self.sensitivity
    }

    /// Empty every cache.
    pub fn clear_all(&self) {
        self.npv.clear();
        self.irr.clear();
        self.monte_carlo.clear();
        self.sensitivity.clear();
    }

    /// Counter snapshot for every cache.
    pub fn report(&self) -> CacheReport {
        CacheReport {
            npv: self.npv.stats(),
            irr: self.irr.stats(),
            monte_carlo: self.monte_carlo.stats(),
            sensitivity: self.sensitivity.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::key::CacheKey;
    use roi_core::config::CachePolicy;
    use std::time::Duration;

    #[test]
    fn test_independent_policies() {
        let settings = CacheSettings {
            npv: CachePolicy::new(1, 10),
            monte_carlo: CachePolicy::new(5, 100),
            ..CacheSettings::default()
        };
        let clock = Arc::new(ManualClock::new());
        let caches = CacheManager::with_clock(&settings, clock.clone());

        let npv_key = CacheKey::derive(CalculationKind::Npv, &1).unwrap();
        let irr_key = CacheKey::derive(CalculationKind::Irr, &1).unwrap();
        caches.npv().insert(npv_key.clone(), 1.0);
        caches.irr().insert(irr_key.clone(), 0.1);

        clock.advance(Duration::from_secs(10));
        assert_eq!(caches.npv().get(&npv_key), None);
        assert_eq!(caches.irr().get(&irr_key), Some(0.1));

        let report = caches.report();
        assert_eq!(report.npv.expirations, 1);
        assert_eq!(report.irr.hits, 1);
    }

    #[test]
    fn test_clear_all() {
        let caches = CacheManager::default();
        let key = CacheKey::derive(CalculationKind::Npv, &"k").unwrap();
        caches.npv().insert(key.clone(), 2.0);
        caches.clear_all();
        assert!(caches.npv().is_empty());
    }
}
