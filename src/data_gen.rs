//! Sample array allocation and parallel uniform fill.
//!
//! The array is reserved once with [`alloc_samples`], which reports an
//! allocation failure as [`BenchError::AllocationError`](crate::BenchError)
//! instead of aborting. [`fill_uniform`] then writes the reserved capacity in
//! place: worker `i` owns the `i`-th contiguous range from
//! [`partition_ranges`](crate::partition::partition_ranges) and draws from its
//! own `StdRng` seeded with `base_seed ^ i`, so no state is shared while
//! filling.

use std::mem::MaybeUninit;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{BenchConfig, SeedPolicy};
use crate::error::{allocation_error, validation_error, Result};
use crate::partition::partition_ranges;
use crate::Sample;

/// Reserves exactly `len` samples. The returned vector is empty.
pub fn alloc_samples(len: usize) -> Result<Vec<Sample>> {
    let bytes = len.saturating_mul(std::mem::size_of::<Sample>());
    let mut data: Vec<Sample> = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|e| allocation_error(bytes, e.to_string()))?;
    debug!(len, bytes, "sample buffer reserved");
    Ok(data)
}

/// Base seed for a generation pass.
pub fn resolve_seed(policy: SeedPolicy) -> u64 {
    match policy {
        SeedPolicy::Fixed(seed) => seed,
        SeedPolicy::Clock => {
            let now = Utc::now();
            now.timestamp_nanos_opt()
                .unwrap_or_else(|| now.timestamp()) as u64
        }
    }
}

/// Seed of worker `worker` for a given base seed.
pub fn worker_seed(base_seed: u64, worker: usize) -> u64 {
    base_seed ^ worker as u64
}

/// Fills `buf` with `len` samples uniform in `[0, max_value]`.
///
/// `buf` must be empty with room for `len` elements, as returned by
/// [`alloc_samples`]. The work is split into `workers` disjoint ranges, each
/// with an independent random stream.
pub fn fill_uniform(
    buf: &mut Vec<Sample>,
    len: usize,
    max_value: Sample,
    seed: SeedPolicy,
    workers: usize,
) -> Result<()> {
    if !buf.is_empty() {
        return Err(validation_error("sample buffer must be empty before filling"));
    }
    if buf.capacity() < len {
        return Err(validation_error(format!(
            "sample buffer holds {} elements, {} requested",
            buf.capacity(),
            len
        )));
    }
    if max_value < 0 {
        return Err(validation_error(format!(
            "domain bound must be non-negative, got {max_value}"
        )));
    }

    let base_seed = resolve_seed(seed);
    info!(len, max_value, workers, base_seed, "generating samples");

    let ranges = partition_ranges(len, workers);
    let mut rest: &mut [MaybeUninit<Sample>] = &mut buf.spare_capacity_mut()[..len];
    let mut chunks = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
        chunks.push(head);
        rest = tail;
    }

    chunks
        .into_par_iter()
        .enumerate()
        .for_each(|(worker, chunk)| {
            let mut rng = StdRng::seed_from_u64(worker_seed(base_seed, worker));
            for slot in chunk.iter_mut() {
                slot.write(rng.random_range(0..=max_value));
            }
        });

    // SAFETY:
    // - the ranges from `partition_ranges` cover `0..len` without gaps
    // - every slot of every range was written above
    // - `len <= capacity` was checked on entry
    unsafe { buf.set_len(len) };

    Ok(())
}

/// Allocates and fills the sample array described by `config`.
pub fn generate_samples(config: &BenchConfig) -> Result<Vec<Sample>> {
    config.validate()?;
    let workers = config
        .generator_workers
        .unwrap_or_else(rayon::current_num_threads);
    let mut data = alloc_samples(config.array_size)?;
    fill_uniform(
        &mut data,
        config.array_size,
        config.max_value,
        config.seed,
        workers,
    )?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_is_empty_with_capacity() {
        let data = alloc_samples(1024).unwrap();
        assert!(data.is_empty());
        assert!(data.capacity() >= 1024);
    }

    #[test]
    fn test_alloc_failure_is_reported() {
        let err = alloc_samples(usize::MAX).unwrap_err();
        assert!(matches!(err, crate::BenchError::AllocationError { .. }));
    }

    #[test]
    fn test_values_within_domain() {
        let mut data = alloc_samples(100_000).unwrap();
        fill_uniform(&mut data, 100_000, 1_000, SeedPolicy::Fixed(7), 6).unwrap();
        assert_eq!(data.len(), 100_000);
        assert!(data.iter().all(|&v| (0..=1_000).contains(&v)));
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let config = BenchConfig {
            array_size: 50_000,
            generator_workers: Some(4),
            ..BenchConfig::quick()
        };
        let a = generate_samples(&config).unwrap();
        let b = generate_samples(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_workers_get_distinct_streams() {
        let mut data = alloc_samples(2_000).unwrap();
        fill_uniform(&mut data, 2_000, 1_000_000, SeedPolicy::Fixed(0), 2).unwrap();
        assert_ne!(data[..1_000], data[1_000..]);
    }

    #[test]
    fn test_zero_domain_gives_zeros() {
        let mut data = alloc_samples(500).unwrap();
        fill_uniform(&mut data, 500, 0, SeedPolicy::Clock, 3).unwrap();
        assert!(data.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_rejects_bad_buffers() {
        let mut small = alloc_samples(10).unwrap();
        assert!(fill_uniform(&mut small, usize::MAX / 8, 10, SeedPolicy::Fixed(1), 2).is_err());

        let mut filled = vec![1, 2, 3];
        assert!(fill_uniform(&mut filled, 3, 10, SeedPolicy::Fixed(1), 2).is_err());

        let mut data = alloc_samples(10).unwrap();
        assert!(fill_uniform(&mut data, 10, -5, SeedPolicy::Fixed(1), 2).is_err());
    }

    #[test]
    fn test_more_workers_than_samples() {
        let mut data = alloc_samples(10).unwrap();
        fill_uniform(&mut data, 10, 100, SeedPolicy::Fixed(3), usize::MAX).unwrap();
        assert_eq!(data.len(), 10);
        assert!(data.iter().all(|&v| (0..=100).contains(&v)));
    }

    #[test]
    fn test_generate_rejects_too_many_workers() {
        let config = BenchConfig {
            array_size: 10,
            generator_workers: Some(usize::MAX),
            ..BenchConfig::quick()
        };
        let err = generate_samples(&config).unwrap_err();
        assert!(matches!(err, crate::BenchError::ValidationError { .. }));
    }

    #[test]
    fn test_worker_seed_mixes_index() {
        assert_eq!(worker_seed(0b1010, 0), 0b1010);
        assert_eq!(worker_seed(0b1010, 3), 0b1001);
    }
}
