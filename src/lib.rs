//! # minmaxmean
//!
//! Serial versus data-parallel computation of the minimum, maximum and
//! arithmetic mean over a large uniformly-random integer array, and the
//! harness that measures how the parallel reduction scales with the number
//! of worker threads.
//!
//! The pipeline is:
//!
//! 1. [`data_gen`]: fallible allocation and a parallel, per-worker seeded fill
//!    of `N` samples drawn uniformly from `[0, M]`.
//! 2. [`reduce`]: the serial scan and the partition/combine parallel reduction,
//!    both producing a [`reduce::Summary`].
//! 3. [`harness`]: repeated timed runs per worker count, speedup against the
//!    single-worker baseline, records handed to [`report`] sinks.
//!
//! # Quick start
//!
//! ```rust
//! use minmaxmean::{config::BenchConfig, data_gen, reduce};
//!
//! let config = BenchConfig::quick();
//! let data = data_gen::generate_samples(&config).unwrap();
//!
//! let serial = reduce::serial_min_max_mean(&data).unwrap();
//! let parallel = reduce::parallel_min_max_mean(&data, 4).unwrap();
//!
//! assert_eq!(serial.min, parallel.min);
//! assert_eq!(serial.max, parallel.max);
//! ```

pub mod config;
pub mod data_gen;
pub mod error;
pub mod harness;
pub mod partition;
pub mod reduce;
pub mod report;
pub mod stats;

pub use error::{BenchError, Result};

/// Element type of the sample array.
pub type Sample = i32;

/// Number of samples generated for a full benchmark (10^9).
pub const ARRAY_SIZE: usize = 1_000_000_000;

/// Inclusive upper bound of the sample domain `{0, 1, ..., MAX_VALUE}`.
pub const MAX_VALUE: Sample = 1_000_000_000;

/// Timed repetitions per worker count.
pub const NUM_RUNS: usize = 5;

/// Worker counts measured, in order. The first entry is the speedup baseline.
pub const THREAD_COUNTS: &[usize] = &[1, 2, 4, 6, 8, 10, 12, 14, 16];

/// Upper bound accepted for any worker count, generator or reducer.
pub const MAX_WORKERS: usize = 1024;

/// CSV output, relative to the current working directory.
pub const RESULTS_PATH: &str = "results.csv";
