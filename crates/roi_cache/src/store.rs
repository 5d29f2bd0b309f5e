//! Bounded LRU cache with per-entry time-to-live.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use roi_core::config::CachePolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::key::{CacheKey, CalculationKind};

/// A cached value with its bookkeeping. Never mutated after insertion.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    /// Cached result
    pub value: V,
    /// Insertion time
    pub created_at: Instant,
    /// Lifetime from `created_at`
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// `true` once the entry's age reaches its TTL.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Counter snapshot for one cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Successful `put`s
    pub insertions: u64,
    /// Entries dropped for capacity
    pub evictions: u64,
    /// Entries dropped for age
    pub expirations: u64,
}

impl CacheStats {
    /// `hits / (hits + misses)`, zero before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}

/// Thread-safe bounded cache for one calculation kind.
///
/// A single mutex guards the LRU list; counters are atomics so
/// [`stats`](Self::stats) never blocks. Expired entries are purged on
/// every `get` and `put`.
///
/// ```
/// use std::time::Duration;
/// use roi_cache::{CacheKey, CalculationKind, TtlLruCache};
/// use roi_core::config::CachePolicy;
///
/// let cache: TtlLruCache<f64> = TtlLruCache::new(CalculationKind::Npv, CachePolicy::new(2, 60));
/// let key = CacheKey::derive(CalculationKind::Npv, &[1.0, 2.0]).unwrap();
///
/// assert_eq!(cache.get(&key), None);
/// cache.put(key.clone(), 3.0, Duration::from_secs(10));
/// assert_eq!(cache.get(&key), Some(3.0));
/// assert_eq!(cache.stats().hits, 1);
/// ```
pub struct TtlLruCache<V> {
    kind: CalculationKind,
    default_ttl: Duration,
    capacity: NonZeroUsize,
    entries: Mutex<LruCache<CacheKey, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl<V: Clone> TtlLruCache<V> {
    /// Cache following `policy`, timed by the system clock.
    pub fn new(kind: CalculationKind, policy: CachePolicy) -> Self {
        Self::with_clock(kind, policy, Arc::new(SystemClock))
    }

    /// Cache following `policy` with an injected clock.
    ///
    /// A zero capacity is raised to one.
    pub fn with_clock(kind: CalculationKind, policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(policy.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            kind,
            default_ttl: policy.ttl(),
            capacity,
            entries: Mutex::new(LruCache::new(capacity)),
            clock,
            counters: Counters::default(),
        }
    }

    /// Calculation kind served by this cache.
    pub fn kind(&self) -> CalculationKind {
        self.kind
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// TTL applied by [`insert`](Self::insert).
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Live value for `key`, refreshing its recency.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        self.purge_expired(&mut entries, now);

        match entries.get(key) {
            Some(entry) => {
                Counters::bump(&self.counters.hits, 1);
                debug!(kind = %self.kind, key = %key, "Cache hit");
                Some(entry.value.clone())
            }
            None => {
                Counters::bump(&self.counters.misses, 1);
                debug!(kind = %self.kind, key = %key, "Cache miss");
                None
            }
        }
    }

    /// Store `value` for `ttl`, evicting the least recently used entry if
    /// the cache is full. Replaces any existing entry for `key`.
    pub fn put(&self, key: CacheKey, value: V, ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        self.purge_expired(&mut entries, now);

        let entry = CacheEntry {
            value,
            created_at: now,
            ttl,
        };
        if let Some((evicted, _)) = entries.push(key.clone(), entry) {
            if evicted != key {
                Counters::bump(&self.counters.evictions, 1);
                debug!(kind = %self.kind, key = %evicted, "Cache eviction");
            }
        }
        Counters::bump(&self.counters.insertions, 1);
    }

    /// [`put`](Self::put) with the default TTL.
    pub fn insert(&self, key: CacheKey, value: V) {
        self.put(key, value, self.default_ttl);
    }

    /// Remove `key`. Returns whether an entry was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently held, including not yet purged ones.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// `true` when no entries are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counter snapshot.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Return the cached value for `key` or compute, store and return it.
    ///
    /// The lock is not held while `compute` runs, so two threads missing on
    /// the same key may both compute; results are idempotent so the later
    /// `put` simply replaces the earlier one. Errors are not cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Key `input` under this cache's kind and delegate to
    /// [`get_or_try_insert_with`](Self::get_or_try_insert_with).
    ///
    /// A key that cannot be derived degrades to a forced miss: `compute`
    /// runs, nothing is stored and a warning is logged.
    pub fn get_or_compute<I, E, F>(&self, input: &I, compute: F) -> Result<V, E>
    where
        I: Serialize + ?Sized,
        F: FnOnce() -> Result<V, E>,
    {
        match CacheKey::derive(self.kind, input) {
            Ok(key) => self.get_or_try_insert_with(key, compute),
            Err(err) => {
                warn!(kind = %self.kind, error = %err, "Cache key unavailable, bypassing cache");
                Counters::bump(&self.counters.misses, 1);
                compute()
            }
        }
    }

    fn purge_expired(&self, entries: &mut LruCache<CacheKey, CacheEntry<V>>, now: Instant) {
        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        if expired.is_empty() {
            return;
        }
        for key in &expired {
            entries.pop(key);
        }
        Counters::bump(&self.counters.expirations, expired.len() as u64);
        debug!(kind = %self.kind, count = expired.len(), "Expired cache entries purged");
    }
}

impl<V> std::fmt::Debug for TtlLruCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlLruCache")
            .field("kind", &self.kind)
            .field("capacity", &self.capacity)
            .field("default_ttl", &self.default_ttl)
            .field("stats", &self.counters.snapshot())
            .finish()
    }
}
