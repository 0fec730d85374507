//! Console table, CSV file and end-of-run performance summary.
//!
//! The CSV schema is the contract with external plotting tools:
//!
//! ```text
//! Threads,Runtime(s),Speedup,Min,Max,Mean
//! 1,0.512345,1.0000,0,1000000000,500012345.67
//! ```
//!
//! Runtime carries 6 decimals, speedup 4 and mean 2.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{io_error, Result};
use crate::harness::{BenchRecord, ReportSink};

pub const CSV_HEADER: &str = "Threads,Runtime(s),Speedup,Min,Max,Mean";

pub const TABLE_HEADER: &str =
    "Thread Count | Runtime(s) | Speedup | Min Value | Max Value | Mean Value";

pub const TABLE_SEPARATOR: &str =
    "-------------|------------|---------|-----------|-----------|------------";

/// One CSV data row, without the trailing newline.
pub fn csv_row(record: &BenchRecord) -> String {
    format!(
        "{},{:.6},{:.4},{},{},{:.2}",
        record.threads,
        record.runtime_secs,
        record.speedup,
        record.summary.min,
        record.summary.max,
        record.summary.mean
    )
}

/// One console table row, aligned under [`TABLE_HEADER`].
pub fn table_row(record: &BenchRecord) -> String {
    format!(
        "{:>12} | {:>10.4} | {:>7.2} | {:>9} | {:>9} | {:>10.2}",
        record.threads,
        record.runtime_secs,
        record.speedup,
        record.summary.min,
        record.summary.max,
        record.summary.mean
    )
}

/// Prints the results table to any writer, stdout by default.
pub struct ConsoleTable<W: Write> {
    out: W,
}

impl ConsoleTable<io::Stdout> {
    /// Table printed to the process's standard output.
    pub fn stdout() -> Self {
        ConsoleTable { out: io::stdout() }
    }
}

impl<W: Write> ConsoleTable<W> {
    /// Table written to any writer, e.g. a `Vec<u8>` in tests.
    pub fn new(out: W) -> Self {
        ConsoleTable { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleTable<W> {
    fn begin(&mut self) -> Result<()> {
        writeln!(self.out, "{TABLE_HEADER}")
            .and_then(|_| writeln!(self.out, "{TABLE_SEPARATOR}"))
            .map_err(|e| io_error("<console>", e))
    }

    fn record(&mut self, record: &BenchRecord) -> Result<()> {
        writeln!(self.out, "{}", table_row(record))
            .and_then(|_| self.out.flush())
            .map_err(|e| io_error("<console>", e))
    }
}

/// CSV results file. Created (or truncated) by [`CsvReport::create`], which
/// also writes the header, so the header exists even if no record follows.
pub struct CsvReport {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvReport {
    /// Creates or truncates `path` and writes [`CSV_HEADER`].
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::IoError`](crate::BenchError::IoError) if the file
    /// cannot be created or the header cannot be written.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| io_error(&path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{CSV_HEADER}").map_err(|e| io_error(&path, e))?;
        Ok(CsvReport { path, writer })
    }

    /// Location of the results file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for CsvReport {
    fn record(&mut self, record: &BenchRecord) -> Result<()> {
        writeln!(self.writer, "{}", csv_row(record)).map_err(|e| io_error(&self.path, e))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| io_error(&self.path, e))?;
        info!(path = %self.path.display(), "CSV results written");
        Ok(())
    }
}

/// Best-of figures over a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    /// `(threads, speedup)` of the highest speedup.
    pub best_speedup: (usize, f64),
    /// Average runtime of the first (single-worker) record.
    pub serial_runtime: f64,
    /// `(threads, seconds)` of the lowest average runtime.
    pub best_runtime: (usize, f64),
    /// `(threads, percent)` of the highest `speedup / threads * 100`.
    pub best_efficiency: (usize, f64),
}

impl PerformanceSummary {
    /// `None` when there are no records.
    pub fn from_records(records: &[BenchRecord]) -> Option<Self> {
        let first = records.first()?;

        let mut best_speedup = (first.threads, first.speedup);
        let mut best_runtime = (first.threads, first.runtime_secs);
        let mut best_efficiency = (first.threads, first.efficiency() * 100.0);

        for r in &records[1..] {
            if r.speedup > best_speedup.1 {
                best_speedup = (r.threads, r.speedup);
            }
            if r.runtime_secs < best_runtime.1 {
                best_runtime = (r.threads, r.runtime_secs);
            }
            let efficiency = r.efficiency() * 100.0;
            if efficiency > best_efficiency.1 {
                best_efficiency = (r.threads, efficiency);
            }
        }

        Some(PerformanceSummary {
            best_speedup,
            serial_runtime: first.runtime_secs,
            best_runtime,
            best_efficiency,
        })
    }
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Summary:")?;
        writeln!(
            f,
            "Best speedup: {:.2}x with {} threads",
            self.best_speedup.1, self.best_speedup.0
        )?;
        writeln!(f, "Serial runtime: {:.4} seconds", self.serial_runtime)?;
        writeln!(
            f,
            "Best parallel runtime: {:.4} seconds with {} threads",
            self.best_runtime.1, self.best_runtime.0
        )?;
        write!(
            f,
            "Best efficiency: {:.1}% with {} threads",
            self.best_efficiency.1, self.best_efficiency.0
        )
    }
}
