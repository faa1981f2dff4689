//! Core run configuration types for the BM harness.

use crate::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// User-provided run configuration, decoded from a JSON input document.
///
/// Field names and units match the external input contract: limits are
/// given as integers (milliseconds and megabytes) and every command is a
/// full command line that is whitespace-tokenized at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmUserConfig {
    /// Per-job wall-clock limit in milliseconds.
    pub time_limit: u64,
    /// Per-job address-space ceiling in megabytes.
    pub memory_limit: u64,
    /// Requested worker count.
    pub number_processes: usize,
    /// Destination path of the aggregate output file.
    pub output_filename: String,
    /// Command lines to execute, one per job, in input order.
    pub commands: Vec<String>,
}

/// Internal run configuration with typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmRunConfig {
    /// Per-job wall-clock limit.
    pub time_limit: Duration,
    /// Per-job address-space ceiling in megabytes.
    pub memory_limit_mb: u64,
    /// Requested worker count, before capping to the host's parallelism.
    pub requested_workers: usize,
    /// Destination path of the aggregate output file.
    pub output_path: PathBuf,
    /// Command lines to execute, one per job, in input order.
    pub commands: Vec<String>,
}

impl BmUserConfig {
    /// Load a run configuration from a JSON file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_json(&contents)
    }

    /// Parse a run configuration from a JSON string.
    ///
    /// Decoding is strict about field types: a non-integer limit or a
    /// non-string command fails here, before any job runs.
    pub fn from_json(value: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(value)?;
        debug!(
            "Parsed run configuration with {} commands",
            config.commands.len()
        );
        Ok(config)
    }
}

impl BmRunConfig {
    /// Convert a user configuration to the internal configuration.
    pub fn from_user_config(config: BmUserConfig) -> Self {
        Self {
            time_limit: Duration::from_millis(config.time_limit),
            memory_limit_mb: config.memory_limit,
            requested_workers: config.number_processes,
            output_path: PathBuf::from(config.output_filename),
            commands: config.commands,
        }
    }
}
