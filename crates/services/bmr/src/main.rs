//! BM Runner (bmr)
//!
//! Batch benchmark harness: executes the commands listed in a JSON run
//! configuration concurrently under per-job wall-clock and memory
//! limits, and aggregates every result into a single output file that
//! stays recoverable across interruptions.
//!
//! # Examples
//!
//! ```bash
//! # Run the benchmarks described in an input file
//! bmr -i experiments.json
//!
//! # Same run without per-job console output
//! bmr -i experiments.json -d
//! ```

use std::process::ExitCode;
use std::time::Duration;

use bm_config::run_config::{BmRunConfig, BmUserConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bmr::cli::Cli;
use bmr::orchestrator;

/// Main entry point for the BM Runner.
///
/// Initializes logging, loads and validates the run configuration, and
/// hands control to the orchestrator. Exit codes: 2 for a missing or
/// unreadable input file, 1 for a malformed configuration or a run that
/// could not start, 0 otherwise.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.disable_output {
        "bmr=warn"
    } else {
        "bmr=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(exit_code) => return exit_code,
    };
    describe_run(&cli, &config);

    match orchestrator::run(config).await {
        Ok(elapsed) => {
            report_elapsed(elapsed);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Run failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> core::result::Result<BmRunConfig, ExitCode> {
    match BmUserConfig::from_file(&cli.ifile) {
        Ok(user_config) => Ok(BmRunConfig::from_user_config(user_config)),
        Err(bm_config::error::Error::IO(err)) => {
            eprintln!("Input file {} can't be read: {err}", cli.ifile.display());
            print_usage();
            Err(ExitCode::from(2))
        }
        Err(err) => {
            eprintln!("Error in input file: {err}");
            eprintln!(
                "time_limit, memory_limit and number_processes must be integers, \
                 output_filename a string and commands a list of shell commands."
            );
            print_usage();
            Err(ExitCode::from(1))
        }
    }
}

fn print_usage() {
    eprintln!("Provide an input file in the following way: bmr -i <input_file>.json");
    eprintln!("To disable the per-job output set flag -d.");
}

fn describe_run(cli: &Cli, config: &BmRunConfig) {
    info!("Input file: {}", cli.ifile.display());
    info!(
        "Metadata: {}ms, {}MB, {} processes requested",
        config.time_limit.as_millis(),
        config.memory_limit_mb,
        config.requested_workers
    );
    for (index, command) in config.commands.iter().enumerate() {
        info!("{index}. {command}");
    }
    info!("Write to: {}", config.output_path.display());
}

fn report_elapsed(elapsed: Duration) {
    let seconds = elapsed.as_secs();
    if seconds < 60 {
        info!("Harness worked for approx. {seconds} seconds");
    } else {
        info!(
            "Harness worked for approx. {:.2} minutes",
            elapsed.as_secs_f64() / 60.0
        );
    }
}
