//! Descriptive statistics over the timed repetitions of one configuration.

use statrs::statistics::Statistics;

/// Summary of runtime samples, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    /// Arithmetic mean of the samples.
    pub mean: f64,
    /// Fastest run.
    pub min: f64,
    /// Slowest run.
    pub max: f64,
    /// Sample standard deviation; zero with fewer than two samples.
    pub std_dev: f64,
    /// `std_dev / mean * 100`; zero when the mean is zero.
    pub cv_percent: f64,
    /// Number of runs the figures cover.
    pub sample_count: usize,
}

impl TimingStats {
    /// Computes the statistics of `samples`. An empty slice yields all zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return TimingStats {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                std_dev: 0.0,
                cv_percent: 0.0,
                sample_count: 0,
            };
        }

        let mean = Statistics::mean(samples.iter());
        let min = Statistics::min(samples.iter());
        let max = Statistics::max(samples.iter());
        let std_dev = if samples.len() < 2 {
            0.0
        } else {
            Statistics::std_dev(samples.iter())
        };
        let cv_percent = if mean > 0.0 {
            std_dev / mean * 100.0
        } else {
            0.0
        };

        TimingStats {
            mean,
            min,
            max,
            std_dev,
            cv_percent,
            sample_count: samples.len(),
        }
    }
}
