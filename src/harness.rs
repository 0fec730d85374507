//! Measurement harness: for each worker count, repeated timed reductions,
//! averaged runtime, speedup against the single-worker baseline.
//!
//! Configurations run strictly in the order of
//! [`BenchConfig::thread_counts`]. The first one is the 1-worker baseline
//! (enforced by [`BenchConfig::validate`]), so its average is known before any
//! other speedup is computed.
//!
//! Each finished [`BenchRecord`] is handed to every [`ReportSink`] right away,
//! which lets the console table and the CSV file fill in while later
//! configurations are still running.

use std::hint::black_box;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::error::{validation_error, BenchError, Result};
use crate::reduce::{Reducer, Summary};
use crate::stats::TimingStats;
use crate::Sample;

/// Outcome of one worker-count configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchRecord {
    /// Worker count of the configuration.
    pub threads: usize,
    /// Total elapsed time over all timed runs divided by the run count.
    pub runtime_secs: f64,
    /// Baseline runtime divided by `runtime_secs`.
    pub speedup: f64,
    /// Result of the first timed run.
    pub summary: Summary<Sample>,
    /// Spread of the per-run timings.
    pub timing: TimingStats,
}

impl BenchRecord {
    /// Speedup per worker, `1.0` meaning perfect scaling.
    pub fn efficiency(&self) -> f64 {
        self.speedup / self.threads as f64
    }
}

/// Receives benchmark records as they are produced.
pub trait ReportSink {
    /// Called once before the first configuration runs.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, record: &BenchRecord) -> Result<()>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects records in memory.
impl ReportSink for Vec<BenchRecord> {
    fn record(&mut self, record: &BenchRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// One full min/max/mean pass over the sample array, as timed by [`measure`].
pub trait Reduction {
    /// Worker count reported in logs and errors.
    fn workers(&self) -> usize;

    /// Reduces `data` once.
    fn run(&self, data: &[Sample]) -> Result<Summary<Sample>>;
}

impl Reduction for Reducer {
    fn workers(&self) -> usize {
        Reducer::workers(self)
    }

    fn run(&self, data: &[Sample]) -> Result<Summary<Sample>> {
        self.reduce(data)
    }
}

/// `baseline / runtime`, with equal runtimes giving exactly `1.0`.
pub fn speedup(baseline_secs: f64, runtime_secs: f64) -> f64 {
    if baseline_secs == runtime_secs {
        1.0
    } else if runtime_secs > 0.0 {
        baseline_secs / runtime_secs
    } else {
        f64::INFINITY
    }
}

/// Times `config.num_runs` reductions with `reducer`.
///
/// Returns the per-run elapsed seconds and the first run's summary. With
/// `config.verify_repeats`, every later summary must match the first one.
pub fn measure<R: Reduction + ?Sized>(
    reducer: &R,
    data: &[Sample],
    config: &BenchConfig,
) -> Result<(Vec<f64>, Summary<Sample>)> {
    for _ in 0..config.warmup_runs {
        black_box(reducer.run(black_box(data))?);
    }

    let mut times = Vec::with_capacity(config.num_runs);
    let mut first: Option<Summary<Sample>> = None;

    for run in 0..config.num_runs {
        let start = Instant::now();
        let summary = reducer.run(black_box(data))?;
        let elapsed = start.elapsed().as_secs_f64();
        times.push(elapsed);

        debug!(threads = reducer.workers(), run, elapsed, "timed run");

        if run == 0 {
            first = Some(summary);
        } else if let Some(expected) = first.as_ref().filter(|_| config.verify_repeats) {
            if !expected.matches(&summary) {
                return Err(BenchError::InconsistentResult {
                    threads: reducer.workers(),
                    run,
                    expected: expected.to_string(),
                    found: summary.to_string(),
                });
            }
        }
    }

    let summary =
        first.ok_or_else(|| validation_error("at least one timed run is required"))?;
    Ok((times, summary))
}

/// Runs every configured worker count over `data`.
pub fn run_benchmark(
    config: &BenchConfig,
    data: &[Sample],
    sinks: &mut [&mut dyn ReportSink],
) -> Result<Vec<BenchRecord>> {
    config.validate()?;

    for sink in sinks.iter_mut() {
        sink.begin()?;
    }

    let mut records = Vec::with_capacity(config.thread_counts.len());
    let mut baseline: Option<f64> = None;

    for &threads in &config.thread_counts {
        let reducer = Reducer::new(threads)?;
        info!(threads, strategy = %reducer.strategy(), runs = config.num_runs, "measuring");

        let (times, summary) = measure(&reducer, data, config)?;
        let runtime_secs = times.iter().sum::<f64>() / config.num_runs as f64;

        let baseline_secs = *baseline.get_or_insert(runtime_secs);
        let record = BenchRecord {
            threads,
            runtime_secs,
            speedup: speedup(baseline_secs, runtime_secs),
            summary,
            timing: TimingStats::from_samples(&times),
        };

        debug!(
            threads,
            runtime_secs,
            speedup = record.speedup,
            cv_percent = record.timing.cv_percent,
            "configuration done"
        );

        for sink in sinks.iter_mut() {
            sink.record(&record)?;
        }
        records.push(record);
    }

    for sink in sinks.iter_mut() {
        sink.finish()?;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn small_config(thread_counts: Vec<usize>, num_runs: usize) -> BenchConfig {
        BenchConfig {
            array_size: 10_000,
            num_runs,
            thread_counts,
            ..BenchConfig::quick()
        }
    }

    #[test]
    fn test_speedup_rules() {
        assert_eq!(speedup(0.5, 0.5), 1.0);
        assert_eq!(speedup(0.0, 0.0), 1.0);
        assert_eq!(speedup(1.0, 0.25), 4.0);
        assert!(speedup(1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_measure_returns_one_time_per_run() {
        let data: Vec<Sample> = (0..1_000).collect();
        let reducer = Reducer::new(2).unwrap();
        let config = BenchConfig {
            warmup_runs: 2,
            ..small_config(vec![1, 2], 4)
        };
        let (times, summary) = measure(&reducer, &data, &config).unwrap();
        assert_eq!(times.len(), 4);
        assert!(times.iter().all(|&t| t >= 0.0));
        assert_eq!(summary.min, 0);
        assert_eq!(summary.max, 999);
        assert_eq!(summary.mean, 499.5);
    }

    /// Returns a mean that grows by one on every call.
    struct Drifting {
        calls: Cell<usize>,
    }

    impl Drifting {
        fn new() -> Self {
            Drifting { calls: Cell::new(0) }
        }
    }

    impl Reduction for Drifting {
        fn workers(&self) -> usize {
            3
        }

        fn run(&self, _data: &[Sample]) -> Result<Summary<Sample>> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            Ok(Summary {
                min: 0,
                max: 9,
                mean: 4.5 + call as f64,
            })
        }
    }

    #[test]
    fn test_measure_reports_inconsistent_repeat() {
        let data: Vec<Sample> = vec![0; 4];
        let config = BenchConfig {
            warmup_runs: 0,
            ..small_config(vec![1, 3], 3)
        };

        let err = measure(&Drifting::new(), &data, &config).unwrap_err();
        match &err {
            BenchError::InconsistentResult {
                threads,
                run,
                expected,
                found,
            } => {
                assert_eq!(*threads, 3);
                assert_eq!(*run, 1);
                assert_eq!(expected, "(min=0, max=9, mean=4.50)");
                assert_eq!(found, "(min=0, max=9, mean=5.50)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Run 1 with 3 threads"));
    }

    #[test]
    fn test_measure_skips_verification_when_disabled() {
        let data: Vec<Sample> = vec![0; 4];
        let config = BenchConfig {
            warmup_runs: 0,
            verify_repeats: false,
            ..small_config(vec![1, 3], 3)
        };

        let (times, summary) = measure(&Drifting::new(), &data, &config).unwrap();
        assert_eq!(times.len(), 3);
        assert_eq!(summary.mean, 4.5);
    }

    #[test]
    fn test_measure_warmup_runs_are_not_compared() {
        let data: Vec<Sample> = vec![0; 4];
        let config = BenchConfig {
            warmup_runs: 2,
            ..small_config(vec![1, 3], 1)
        };

        let reducer = Drifting::new();
        let (times, summary) = measure(&reducer, &data, &config).unwrap();
        assert_eq!(times.len(), 1);
        assert_eq!(summary.mean, 6.5);
        assert_eq!(reducer.calls.get(), 3);
    }

    #[test]
    fn test_measure_accepts_consistent_repeats() {
        let data: Vec<Sample> = (0..10).collect();
        let config = small_config(vec![1, 2], 5);
        let reducer = Reducer::new(2).unwrap();

        let (times, summary) = measure(&reducer, &data, &config).unwrap();
        assert_eq!(times.len(), 5);
        assert_eq!(summary, Summary { min: 0, max: 9, mean: 4.5 });
    }

    #[test]
    fn test_records_follow_thread_order_and_baseline() {
        let data: Vec<Sample> = (0..10_000).map(|i| i % 97).collect();
        let config = small_config(vec![1, 2, 4], 2);
        let mut collected: Vec<BenchRecord> = Vec::new();

        let mut sinks: [&mut dyn ReportSink; 1] = [&mut collected];
        let records = run_benchmark(&config, &data, &mut sinks).unwrap();

        assert_eq!(records, collected);
        let threads: Vec<usize> = records.iter().map(|r| r.threads).collect();
        assert_eq!(threads, vec![1, 2, 4]);
        assert_eq!(records[0].speedup, 1.0);
        assert_eq!(records[0].efficiency(), 1.0);
        for r in &records {
            assert_eq!(r.summary.min, 0);
            assert_eq!(r.summary.max, 96);
            assert!(r.summary.matches(&records[0].summary));
            assert_eq!(r.timing.sample_count, 2);
            let expected = records[0].runtime_secs / r.runtime_secs;
            if r.threads != 1 {
                assert!((r.speedup - expected).abs() <= 1e-12 * expected.abs().max(1.0));
            }
        }
    }

    #[test]
    fn test_invalid_config_is_rejected_before_running() {
        let data: Vec<Sample> = vec![1, 2, 3];
        let config = small_config(vec![2, 4], 1);
        let mut collected: Vec<BenchRecord> = Vec::new();
        let mut sinks: [&mut dyn ReportSink; 1] = [&mut collected];
        assert!(run_benchmark(&config, &data, &mut sinks).is_err());
        assert!(collected.is_empty());
    }
}
