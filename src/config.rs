//! Benchmark configuration.
//!
//! The binary runs with the crate-level constants ([`crate::ARRAY_SIZE`],
//! [`crate::MAX_VALUE`], [`crate::NUM_RUNS`], [`crate::THREAD_COUNTS`],
//! [`crate::RESULTS_PATH`]). Everything the pipeline reads goes through a
//! [`BenchConfig`] so tests and benches can shrink the array.

use std::path::PathBuf;

use crate::error::{validation_error, Result};
use crate::{Sample, ARRAY_SIZE, MAX_VALUE, MAX_WORKERS, NUM_RUNS, RESULTS_PATH, THREAD_COUNTS};

/// How the per-worker random streams are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Base seed taken from the wall clock at generation time.
    Clock,
    /// Fixed base seed; worker `i` uses `seed ^ i`.
    Fixed(u64),
}

/// Parameters of one benchmark session.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of samples `N`.
    pub array_size: usize,
    /// Inclusive upper bound `M` of the sample domain.
    pub max_value: Sample,
    /// Timed repetitions per worker count.
    pub num_runs: usize,
    /// Untimed repetitions before measurement.
    pub warmup_runs: usize,
    /// Worker counts to measure; must start with 1.
    pub thread_counts: Vec<usize>,
    /// Workers used to fill the array. `None` uses the global rayon pool size.
    pub generator_workers: Option<usize>,
    /// Base seed of the generator streams.
    pub seed: SeedPolicy,
    /// Compare every repeat's result against the first run.
    pub verify_repeats: bool,
    /// CSV file written by the binary.
    pub output_path: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            array_size: ARRAY_SIZE,
            max_value: MAX_VALUE,
            num_runs: NUM_RUNS,
            warmup_runs: 0,
            thread_counts: THREAD_COUNTS.to_vec(),
            generator_workers: None,
            seed: SeedPolicy::Clock,
            verify_repeats: true,
            output_path: PathBuf::from(RESULTS_PATH),
        }
    }
}

impl BenchConfig {
    /// Small reproducible preset: 1M samples, 3 runs, workers {1, 2, 4}.
    pub fn quick() -> Self {
        BenchConfig {
            array_size: 1_000_000,
            num_runs: 3,
            thread_counts: vec![1, 2, 4],
            seed: SeedPolicy::Fixed(42),
            ..BenchConfig::default()
        }
    }

    /// Checks the invariants the harness relies on.
    ///
    /// Rejects an empty array (the mean would divide by zero), an empty or
    /// zero-containing worker list, a list that does not start with the
    /// single-worker baseline, worker counts above [`MAX_WORKERS`], zero runs,
    /// a negative domain bound, and any `array_size * max_value` that would
    /// overflow the `i64` accumulator.
    pub fn validate(&self) -> Result<()> {
        if self.array_size == 0 {
            return Err(validation_error("array size must be at least 1"));
        }
        if self.max_value < 0 {
            return Err(validation_error(format!(
                "domain bound must be non-negative, got {}",
                self.max_value
            )));
        }
        if self.num_runs == 0 {
            return Err(validation_error("at least one timed run is required"));
        }
        match self.thread_counts.first() {
            None => return Err(validation_error("thread count list is empty")),
            Some(&first) if first != 1 => {
                return Err(validation_error(format!(
                    "thread counts must start with the 1-thread baseline, got {first}"
                )))
            }
            _ => {}
        }
        if self.thread_counts.contains(&0) {
            return Err(validation_error("thread counts must be positive"));
        }
        if let Some(&too_many) = self.thread_counts.iter().find(|&&t| t > MAX_WORKERS) {
            return Err(validation_error(format!(
                "thread count {too_many} exceeds the limit of {MAX_WORKERS}"
            )));
        }
        match self.generator_workers {
            Some(0) => return Err(validation_error("generator workers must be positive")),
            Some(n) if n > MAX_WORKERS => {
                return Err(validation_error(format!(
                    "generator workers {n} exceed the limit of {MAX_WORKERS}"
                )))
            }
            _ => {}
        }

        let worst_sum = i64::try_from(self.array_size)
            .ok()
            .and_then(|n| n.checked_mul(i64::from(self.max_value)));
        if worst_sum.is_none() {
            return Err(validation_error(format!(
                "{} samples of up to {} overflow a 64-bit sum",
                self.array_size, self.max_value
            )));
        }

        Ok(())
    }
}
