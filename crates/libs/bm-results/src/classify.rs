//! Raw-outcome classification.
//!
//! Turns the raw process outcome of one job into a normalized
//! `ExecutionOutcome`. The decision order is fixed: timeout, spawn
//! failure, stderr inspection, JSON parse, required-key validation.

use bm_io::runner::RawOutcome;
use serde_json::Value;

use crate::job::Job;
use crate::outcome::{ExecutionOutcome, JobFailure};

/// Top-level keys every benchmark result must provide.
const REQUIRED_KEYS: [&str; 5] = [
    "command",
    "runtime",
    "weight",
    "actual_stretch",
    "graph_information",
];

/// Keys required under `graph_information`.
const REQUIRED_GRAPH_KEYS: [&str; 5] = ["nodes", "edges", "directed", "weighted", "simple"];

/// Substring marking a memory-exhaustion failure in stderr.
///
/// Target programs are heterogeneous (C++ runtimes report "Memory Limit
/// Exceeded", Python raises "MemoryError"), so the only common signal is
/// the error text. Best-effort heuristic, not a reliable one.
const MEMORY_SIGNATURE: &str = "Memory";

/// Classify the raw outcome of one job.
///
/// Pure function of its inputs: classifying the same outcome twice
/// yields the same result. The one payload mutation performed here is
/// injecting the job's command line under `command` when the target
/// program omitted it.
pub fn classify(job: &Job, raw: &RawOutcome) -> ExecutionOutcome {
    if raw.timed_out {
        return ExecutionOutcome::Failure(JobFailure::TimeLimit);
    }

    if let Some(spawn_error) = &raw.spawn_error {
        return ExecutionOutcome::Failure(JobFailure::Subprocess {
            detail: spawn_error.clone(),
        });
    }

    if !raw.stderr.is_empty() {
        if raw.stderr.contains(MEMORY_SIGNATURE) {
            return ExecutionOutcome::Failure(JobFailure::MemoryLimit);
        }
        return ExecutionOutcome::Failure(JobFailure::Subprocess {
            detail: raw.stderr.clone(),
        });
    }

    let mut payload = match serde_json::from_str::<Value>(&raw.stdout) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            return ExecutionOutcome::Failure(JobFailure::MalformedOutput {
                output: raw.stdout.clone(),
            });
        }
    };

    // Add the command if not included, before key validation
    if payload.get("command").is_none() {
        payload["command"] = Value::String(job.command.clone());
    }

    if !has_required_keys(&payload) {
        return ExecutionOutcome::Failure(JobFailure::MissingKeys {
            output: raw.stdout.clone(),
        });
    }

    ExecutionOutcome::Success { payload }
}

fn has_required_keys(payload: &Value) -> bool {
    if REQUIRED_KEYS.iter().any(|key| payload.get(key).is_none()) {
        return false;
    }
    let graph_information = &payload["graph_information"];
    REQUIRED_GRAPH_KEYS
        .iter()
        .all(|key| graph_information.get(key).is_some())
}
