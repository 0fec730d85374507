//! Min/max/mean reduction over a sample slice.
//!
//! Two strategies share one contract, `&[T] -> Summary<T>`:
//!
//! - **Serial**: one sequential scan keeping a running min, max and sum.
//! - **Parallel**: the slice is cut into one contiguous partition per worker,
//!   each worker reduces its partition to a [`Partial`], and the partials are
//!   folded on the calling thread with [`Partial::combine`].
//!
//! Both end in [`Partial::finish`], which performs the single `sum / count`
//! division. Partition means are never averaged.
//!
//! # Numeric semantics
//!
//! | Quantity | Type | Combine |
//! |----------|------|---------|
//! | min | `T` (integer ordering) | min of mins |
//! | max | `T` (integer ordering) | max of maxes |
//! | sum | `i64` | sum of sums |
//! | count | `usize` | sum of counts |
//! | mean | `f64` | computed once from the totals |
//!
//! Because min, max and the integer sum are exact and associative, the result
//! does not depend on the worker count.
//!
//! # Example
//!
//! ```rust
//! use minmaxmean::reduce::{Reducer, serial_min_max_mean};
//!
//! let data: Vec<i32> = (0..=100).collect();
//! let reducer = Reducer::new(4).unwrap();
//!
//! let parallel = reducer.reduce(&data).unwrap();
//! let serial = serial_min_max_mean(&data).unwrap();
//!
//! assert_eq!(parallel, serial);
//! assert_eq!(parallel.mean, 50.0);
//! ```

use std::fmt;

use num::Bounded;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{thread_pool_error, validation_error, Result};
use crate::partition::partition_ranges;
use crate::Sample;

/// Relative tolerance used when comparing means of two summaries.
pub const MEAN_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Integer element types the reducer accepts.
pub trait Element:
    Copy + Ord + Bounded + Into<i64> + Send + Sync + fmt::Debug + fmt::Display
{
}

impl<T> Element for T where
    T: Copy + Ord + Bounded + Into<i64> + Send + Sync + fmt::Debug + fmt::Display
{
}

/// Final `(min, max, mean)` of one full pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary<T = Sample> {
    /// Smallest sample.
    pub min: T,
    /// Largest sample.
    pub max: T,
    /// `sum / count`, divided once over the whole array.
    pub mean: f64,
}

impl<T: Element> Summary<T> {
    /// Exact min/max equality and mean equality within
    /// [`MEAN_RELATIVE_TOLERANCE`].
    pub fn matches(&self, other: &Summary<T>) -> bool {
        if self.min != other.min || self.max != other.max {
            return false;
        }
        if self.mean == other.mean {
            return true;
        }
        let scale = self.mean.abs().max(other.mean.abs());
        (self.mean - other.mean).abs() <= MEAN_RELATIVE_TOLERANCE * scale
    }
}

impl<T: fmt::Display> fmt::Display for Summary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(min={}, max={}, mean={:.2})", self.min, self.max, self.mean)
    }
}

/// Reduction state of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partial<T = Sample> {
    /// Smallest value seen, `T::max_value()` when empty.
    pub min: T,
    /// Largest value seen, `T::min_value()` when empty.
    pub max: T,
    /// Exact integer sum of the partition.
    pub sum: i64,
    /// Number of values reduced.
    pub count: usize,
}

impl<T: Element> Partial<T> {
    /// The neutral element of [`Partial::combine`].
    pub fn identity() -> Self {
        Partial {
            min: T::max_value(),
            max: T::min_value(),
            sum: 0,
            count: 0,
        }
    }

    /// Sequential scan of `data`.
    pub fn from_slice(data: &[T]) -> Self {
        let mut min = T::max_value();
        let mut max = T::min_value();
        let mut sum: i64 = 0;

        for &value in data {
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }
            let value: i64 = value.into();
            sum += value;
        }

        Partial {
            min,
            max,
            sum,
            count: data.len(),
        }
    }

    /// Associative, commutative merge of two partials.
    pub fn combine(self, other: Self) -> Self {
        Partial {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            sum: self.sum + other.sum,
            count: self.count + other.count,
        }
    }

    /// Turns the totals into a [`Summary`]. Fails on an empty reduction.
    pub fn finish(self) -> Result<Summary<T>> {
        if self.count == 0 {
            return Err(validation_error("cannot reduce an empty sample array"));
        }
        Ok(Summary {
            min: self.min,
            max: self.max,
            mean: self.sum as f64 / self.count as f64,
        })
    }
}

/// Single-threaded fold of partials, starting from [`Partial::identity`].
pub fn combine_partials<T: Element>(partials: impl IntoIterator<Item = Partial<T>>) -> Partial<T> {
    partials
        .into_iter()
        .fold(Partial::identity(), Partial::combine)
}

/// Serial strategy.
pub fn serial_min_max_mean<T: Element>(data: &[T]) -> Result<Summary<T>> {
    Partial::from_slice(data).finish()
}

/// Parallel strategy on a freshly built pool of `workers` threads.
///
/// Prefer a long-lived [`Reducer`] when the same worker count is used
/// repeatedly, so pool construction stays out of the measurement.
pub fn parallel_min_max_mean<T: Element>(data: &[T], workers: usize) -> Result<Summary<T>> {
    Reducer::with_strategy(Strategy::Parallel, workers)?.reduce(data)
}

/// Per-partition partials of `data` computed on the current rayon pool.
fn parallel_partials<T: Element>(data: &[T], workers: usize) -> Vec<Partial<T>> {
    partition_ranges(data.len(), workers)
        .into_par_iter()
        .map(|range| Partial::from_slice(&data[range]))
        .collect()
}

/// Which reduction a [`Reducer`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One sequential scan on the calling thread.
    Serial,
    /// Partition, reduce per worker, combine.
    Parallel,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Serial => write!(f, "serial"),
            Strategy::Parallel => write!(f, "parallel"),
        }
    }
}

/// A reduction bound to a fixed number of workers.
///
/// The parallel strategy owns a dedicated rayon pool with exactly `workers`
/// threads; every [`Reducer::reduce`] call is one fork-join region on it.
pub struct Reducer {
    workers: usize,
    strategy: Strategy,
    pool: Option<ThreadPool>,
}

impl Reducer {
    /// Serial for one worker, parallel otherwise.
    pub fn new(workers: usize) -> Result<Self> {
        let strategy = if workers == 1 {
            Strategy::Serial
        } else {
            Strategy::Parallel
        };
        Self::with_strategy(strategy, workers)
    }

    /// Forces a strategy. The serial strategy ignores `workers` beyond
    /// recording it.
    pub fn with_strategy(strategy: Strategy, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(validation_error("a reducer needs at least one worker"));
        }

        let pool = match strategy {
            Strategy::Serial => None,
            Strategy::Parallel => Some(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("reduce-{i}"))
                    .build()
                    .map_err(|e| thread_pool_error(workers, e))?,
            ),
        };

        debug!(workers, %strategy, "reducer ready");

        Ok(Reducer {
            workers,
            strategy,
            pool,
        })
    }

    /// Worker count this reducer was built for.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Strategy run by [`Reducer::reduce`].
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Runs one full reduction over `data`.
    pub fn reduce<T: Element>(&self, data: &[T]) -> Result<Summary<T>> {
        match &self.pool {
            None => serial_min_max_mean(data),
            Some(pool) => {
                let partials = pool.install(|| parallel_partials(data, self.workers));
                combine_partials(partials).finish()
            }
        }
    }
}
