//! Command-line interface for the BM Runner.

use clap::Parser;
use std::path::PathBuf;

/// Command-line interface for the BM Runner.
#[derive(Parser)]
#[command(name = "bmr")]
#[command(about = "BM Runner - execute benchmark commands under time and memory limits")]
pub struct Cli {
    /// Path to the input configuration file (JSON)
    #[arg(short = 'i', long = "ifile")]
    pub ifile: PathBuf,

    /// Disable per-job console output
    #[arg(short = 'd', long = "disable-output")]
    pub disable_output: bool,
}
