//! minmaxmean benchmark driver.
//!
//! Takes no arguments: the run is described entirely by the crate constants
//! through `BenchConfig::default()`. Results go to stdout and `results.csv`;
//! diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).

use std::process::ExitCode;

use chrono::Local;
use tracing::error;
use tracing_subscriber::EnvFilter;

use minmaxmean::config::BenchConfig;
use minmaxmean::data_gen::generate_samples;
use minmaxmean::harness::{run_benchmark, ReportSink};
use minmaxmean::report::{ConsoleTable, CsvReport, PerformanceSummary};
use minmaxmean::{BenchError, Result};

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(config: &BenchConfig) -> Result<()> {
    config.validate()?;

    println!("Min-Max-Mean Parallel Computing with Rayon");
    println!("Array size: {} elements", config.array_size);
    println!("Domain: {{0, 1, ..., {}}}", config.max_value);
    println!("Started: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));

    println!("Generating {} random numbers...", config.array_size);
    let data = generate_samples(config)?;
    println!("Data generation completed.\n");

    let mut csv = CsvReport::create(&config.output_path)?;
    let mut console = ConsoleTable::stdout();
    let mut sinks: [&mut dyn ReportSink; 2] = [&mut console, &mut csv];
    let records = run_benchmark(config, &data, &mut sinks)?;

    if let Some(summary) = PerformanceSummary::from_records(&records) {
        println!("\n{summary}");
    }
    println!("\nResults saved to {}", csv.path().display());

    Ok(())
}

fn main() -> ExitCode {
    setup_logging();

    match run(&BenchConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e, BenchError::AllocationError { .. }) {
                println!("Memory allocation failed!");
            } else {
                println!("{e}");
            }
            error!("{e}");
            ExitCode::from(1)
        }
    }
}
