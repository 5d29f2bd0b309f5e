//! # roi_cache: Result Cache for the ROI Scenario Engine
//!
//! A bounded, thread-safe cache evicting least-recently-used entries at
//! capacity and any entry older than its time-to-live on each access.
//!
//! - [`CacheKey`]: SHA-256 of the calculation kind plus canonicalised input
//! - [`TtlLruCache`]: one bounded cache with hit/miss/eviction counters
//! - [`CacheManager`]: NPV, IRR, Monte Carlo and sensitivity caches with
//!   independent policies
//! - [`clock`]: injectable time source for deterministic TTL tests
//!
//! Lookups never fail. If an input cannot be keyed the call is a forced
//! miss and the failure is logged.
//!
//! ```
//! use roi_cache::CacheManager;
//! use roi_core::config::CacheSettings;
//!
//! let caches = CacheManager::new(&CacheSettings::default());
//! let flows = vec![-1000.0, 1100.0];
//!
//! let first: Result<f64, ()> = caches.npv().get_or_compute(&(&flows, 0.05), || Ok(47.619));
//! let second: Result<f64, ()> = caches.npv().get_or_compute(&(&flows, 0.05), || Ok(0.0));
//! assert_eq!(first, second);
//! assert_eq!(caches.report().npv.hits, 1);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod clock;
mod error;
pub mod key;
mod manager;
mod store;

pub use error::CacheError;
pub use key::{CacheKey, CalculationKind};
pub use manager::{CacheManager, CacheReport};
pub use store::{CacheEntry, CacheStats, TtlLruCache};
