//! Error types for minmaxmean operations.
//!
//! Every fallible step of the benchmark (allocating the sample array,
//! building a worker pool, writing the CSV report, checking configuration)
//! reports through [`BenchError`] instead of panicking, so the binary can map
//! failures onto exit codes.

use thiserror::Error;

/// Errors that can occur while generating, reducing or reporting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchError {
    /// Memory allocation for the sample array failed.
    #[error("Memory allocation failed: {message} (requested {requested_size} bytes)")]
    AllocationError {
        /// The size in bytes that was requested.
        requested_size: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Configuration or input validation error.
    #[error("Validation error: {message}")]
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
    /// A worker pool of the requested size could not be built.
    #[error("Failed to build a pool of {threads} worker threads: {message}")]
    ThreadPoolError {
        /// Requested worker count.
        threads: usize,
        /// Message from the pool builder.
        message: String,
    },
    /// A repeated run produced a different reduction result than the first run.
    #[error("Run {run} with {threads} threads returned {found}, first run returned {expected}")]
    InconsistentResult {
        /// Worker count of the configuration.
        threads: usize,
        /// Zero-based index of the offending run.
        run: usize,
        /// Rendered result of the first run.
        expected: String,
        /// Rendered result of the offending run.
        found: String,
    },
    /// Reading or writing a report file failed.
    #[error("I/O error on {path}: {message}")]
    IoError {
        /// Path of the file involved.
        path: String,
        /// Message from the underlying I/O error.
        message: String,
    },
}

/// Result type alias for minmaxmean operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Creates an allocation error.
pub fn allocation_error(size: usize, message: impl Into<String>) -> BenchError {
    BenchError::AllocationError {
        requested_size: size,
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> BenchError {
    BenchError::ValidationError {
        message: message.into(),
    }
}

/// Creates an I/O error tagged with the file it concerns.
pub fn io_error(path: impl AsRef<std::path::Path>, err: std::io::Error) -> BenchError {
    BenchError::IoError {
        path: path.as_ref().display().to_string(),
        message: err.to_string(),
    }
}

/// Creates a pool construction error for `threads` workers.
pub fn thread_pool_error(threads: usize, err: rayon::ThreadPoolBuildError) -> BenchError {
    BenchError::ThreadPoolError {
        threads,
        message: err.to_string(),
    }
}
