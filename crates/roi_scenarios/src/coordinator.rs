//! Parallel Execution Coordinator.
//!
//! Splits an iteration budget into fixed-size chunks, runs each chunk's unit
//! of work on a rayon pool and merges the partial statistics.
//!
//! # Determinism
//!
//! The chunk layout depends only on the iteration count and
//! `chunk_size`; chunk `i` is seeded with [`chunk_seed`]`(seed, i)`; and
//! partials are merged in chunk-index order once every chunk has finished.
//! A run therefore produces bit-identical statistics whether it executes on
//! one thread or sixteen.
//!
//! # Cancellation
//!
//! A wall-clock timeout skips chunks that have not started by the deadline.
//! A soft iteration cap shrinks the budget before chunking. Either way the
//! result is tagged [`Completion::Partial`] instead of failing.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use rayon::prelude::*;
use roi_core::config::SimulationSettings;
use roi_core::math::statistics::{percentile_sorted, sample_std_dev, sort_samples};
use roi_core::types::{
    Completion, EngineError, PartialReason, Percentile, SimulationResult, PERCENTILE_LADDER,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::rng::chunk_seed;

/// One unit of work handed to a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk layout
    pub index: usize,
    /// Global iteration indices covered
    pub iterations: Range<usize>,
    /// Seed for this chunk's generator
    pub seed: u64,
}

impl Chunk {
    /// Iterations in this chunk.
    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    /// Whether the chunk covers no iterations.
    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }
}

/// Chunk-completion event for progress observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkProgress {
    /// Chunk that just finished
    pub chunk_index: usize,
    /// Iterations it covered
    pub iterations: usize,
    /// Chunks finished so far, including this one
    pub completed_chunks: usize,
    /// Chunks in the run
    pub total_chunks: usize,
}

/// Mergeable summary of a set of outcomes.
///
/// Non-finite outcomes are counted, not stored, so they cannot poison the
/// sums. The spread is taken from the retained samples in two passes.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialStats {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
    samples: Vec<f64>,
    non_finite: usize,
}

impl PartialStats {
    /// Empty summary with room for `capacity` outcomes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            samples: Vec::with_capacity(capacity),
            non_finite: 0,
        }
    }

    /// Record one outcome.
    #[inline]
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            self.non_finite += 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.samples.push(value);
    }

    /// Append `other` after the outcomes already recorded.
    pub fn merge(&mut self, other: PartialStats) {
        if other.count > 0 {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
        self.count += other.count;
        self.sum += other.sum;
        self.non_finite += other.non_finite;
        self.samples.extend(other.samples);
    }

    /// Finite outcomes recorded.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Non-finite outcomes seen.
    pub fn non_finite(&self) -> usize {
        self.non_finite
    }

    /// Reduce to a [`SimulationResult`].
    ///
    /// # Errors
    ///
    /// - [`EngineError::NonFiniteOutcome`] if any outcome was NaN or infinite
    /// - [`EngineError::InsufficientData`] if nothing was recorded
    pub fn finish(
        mut self,
        elapsed: Duration,
        completion: Completion,
    ) -> Result<SimulationResult, EngineError> {
        if self.non_finite > 0 {
            return Err(EngineError::NonFiniteOutcome {
                count: self.non_finite,
            });
        }
        if self.count == 0 {
            return Err(EngineError::InsufficientData { got: 0, need: 1 });
        }

        let std_dev = sample_std_dev(&self.samples)?;
        sort_samples(&mut self.samples);
        let percentiles = PERCENTILE_LADDER
            .iter()
            .map(|&level| {
                percentile_sorted(&self.samples, level).map(|value| Percentile { level, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SimulationResult {
            mean: self.sum / self.count as f64,
            std_dev,
            min: self.min,
            max: self.max,
            percentiles,
            iterations_completed: self.count,
            elapsed,
            completion,
        })
    }
}

impl Default for PartialStats {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

/// Execution limits for the coordinator.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinatorConfig {
    /// Iterations per chunk
    pub chunk_size: usize,
    /// Upper bound on worker threads
    pub max_workers: usize,
    /// Wall-clock budget
    pub timeout: Option<Duration>,
    /// Soft cap on iterations
    pub iteration_cap: Option<usize>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&SimulationSettings::default())
    }
}

impl From<&SimulationSettings> for CoordinatorConfig {
    fn from(settings: &SimulationSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size.max(1),
            max_workers: settings.max_workers.max(1),
            timeout: settings.timeout(),
            iteration_cap: settings.iteration_cap,
        }
    }
}

/// Runs chunked work across a rayon pool.
///
/// # Examples
///
/// ```
/// use roi_scenarios::coordinator::{ExecutionCoordinator, PartialStats};
///
/// let coordinator = ExecutionCoordinator::default();
/// let result = coordinator
///     .run_distributed(10_000, Some(4), 42, |chunk| {
///         let mut stats = PartialStats::with_capacity(chunk.len());
///         for i in chunk.iterations.clone() {
///             stats.push(i as f64);
///         }
///         stats
///     })
///     .unwrap();
/// assert_eq!(result.iterations_completed, 10_000);
/// assert_eq!(result.mean, 4999.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ExecutionCoordinator {
    config: CoordinatorConfig,
    progress: Option<Sender<ChunkProgress>>,
}

impl ExecutionCoordinator {
    /// Coordinator with explicit limits.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Emit a [`ChunkProgress`] on `sender` as each chunk finishes.
    ///
    /// A disconnected receiver is ignored.
    pub fn with_progress(mut self, sender: Sender<ChunkProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Limits in force.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Fixed chunk layout for `total` iterations.
    pub fn plan(&self, total: usize, seed: u64) -> Vec<Chunk> {
        let size = self.config.chunk_size.max(1);
        (0..total.div_ceil(size))
            .map(|index| {
                let start = index * size;
                Chunk {
                    index,
                    iterations: start..(start + size).min(total),
                    seed: chunk_seed(seed, index),
                }
            })
            .collect()
    }

    /// Threads to use for `chunks` chunks when the caller asks for
    /// `requested` (or lets the coordinator pick).
    ///
    /// Never more than `max_workers`, never more than there are chunks,
    /// never zero.
    pub fn worker_count(&self, requested: Option<usize>, chunks: usize) -> usize {
        let wanted = requested.unwrap_or_else(num_cpus::get);
        wanted.min(self.config.max_workers).min(chunks).max(1)
    }

    /// Run `unit_of_work` over `total_iterations` split into chunks.
    ///
    /// With one worker the chunks run in order on the calling thread;
    /// otherwise they run on a dedicated rayon pool.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidInput`] if `total_iterations` is zero
    /// - [`EngineError::NonFiniteOutcome`] if any outcome was not finite
    /// - [`EngineError::InsufficientData`] if the deadline passed before any
    ///   chunk ran
    pub fn run_distributed<F>(
        &self,
        total_iterations: usize,
        worker_count: Option<usize>,
        seed: u64,
        unit_of_work: F,
    ) -> Result<SimulationResult, EngineError>
    where
        F: Fn(&Chunk) -> PartialStats + Sync + Send,
    {
        if total_iterations == 0 {
            return Err(EngineError::invalid("iterations", "must be positive"));
        }
        let start = Instant::now();
        let deadline = self.config.timeout.map(|t| start + t);

        let budget = match self.config.iteration_cap {
            Some(cap) if cap < total_iterations => cap,
            _ => total_iterations,
        };
        let chunks = self.plan(budget, seed);
        let workers = self.worker_count(worker_count, chunks.len());
        debug!(
            total_iterations,
            budget,
            chunks = chunks.len(),
            workers,
            "Dispatching simulation"
        );

        let completed = AtomicUsize::new(0);
        let run_chunk = |chunk: &Chunk| -> Option<PartialStats> {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return None;
            }
            let stats = unit_of_work(chunk);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(tx) = &self.progress {
                let _ = tx.send(ChunkProgress {
                    chunk_index: chunk.index,
                    iterations: chunk.len(),
                    completed_chunks: done,
                    total_chunks: chunks.len(),
                });
            }
            Some(stats)
        };

        let partials: Vec<Option<PartialStats>> = if workers <= 1 {
            chunks.iter().map(run_chunk).collect()
        } else {
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(|| chunks.par_iter().map(run_chunk).collect()),
                Err(err) => {
                    warn!(error = %err, "Thread pool unavailable, running sequentially");
                    chunks.iter().map(run_chunk).collect()
                }
            }
        };

        let skipped = partials.iter().filter(|p| p.is_none()).count();
        let mut merged = PartialStats::with_capacity(budget);
        for partial in partials.into_iter().flatten() {
            merged.merge(partial);
        }

        let completion = if skipped > 0 {
            warn!(
                skipped_chunks = skipped,
                completed = merged.count(),
                requested = total_iterations,
                "Simulation timed out, returning partial result"
            );
            Completion::Partial {
                reason: PartialReason::Timeout,
                requested: total_iterations,
            }
        } else if budget < total_iterations {
            warn!(
                cap = budget,
                requested = total_iterations,
                "Iteration cap reached, returning partial result"
            );
            Completion::Partial {
                reason: PartialReason::IterationCap,
                requested: total_iterations,
            }
        } else {
            Completion::Complete
        };

        merged.finish(start.elapsed(), completion)
    }
}
