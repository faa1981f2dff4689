//! Classified job outcomes.

use std::fmt;

use serde_json::{Value, json};

/// Classified result of running one job.
///
/// Produced exactly once per job, by exactly one worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// Process exited within limits and stdout passed validation.
    Success {
        /// Validated result object, with `command` injected when absent.
        payload: Value,
    },
    /// The job failed; the run continues without it.
    Failure(JobFailure),
}

/// Per-job failure kinds.
///
/// One variant per kind so the classifier's decision tree is matched
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    /// Wall-clock limit elapsed before the process terminated.
    TimeLimit,
    /// stderr matched the memory-exhaustion signature.
    MemoryLimit,
    /// stdout was not parseable as a single JSON object.
    MalformedOutput {
        /// Raw stdout, preserved in the output file.
        output: String,
    },
    /// The parsed object lacks required keys.
    MissingKeys {
        /// Raw stdout, preserved in the output file.
        output: String,
    },
    /// The process could not be spawned, or wrote to stderr.
    Subprocess {
        /// Spawn error or raw stderr text.
        detail: String,
    },
    /// Anything else that went wrong inside a worker.
    Unexpected {
        /// Raw error text.
        detail: String,
    },
}

impl JobFailure {
    /// Render the failure as the error object embedded in the output
    /// file under the job's key.
    pub fn to_error_object(&self, command: &str) -> Value {
        let mut object = json!({ "command": command });
        match self {
            JobFailure::TimeLimit => {
                object["error"] = json!("Time limit exceeded.");
            }
            JobFailure::MemoryLimit => {
                object["error"] = json!("Memory limit exceeded.");
            }
            JobFailure::MalformedOutput { output } => {
                object["error"] = json!(
                    "The command output can't be parsed. Ensure that the output is formatted in json."
                );
                object["output"] = json!(output);
            }
            JobFailure::MissingKeys { output } => {
                object["error"] = json!("Please provide all required keys in the json output.");
                object["output"] = json!(output);
            }
            JobFailure::Subprocess { detail } | JobFailure::Unexpected { detail } => {
                object["error"] = json!(detail);
            }
        }
        object
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobFailure::TimeLimit => write!(f, "Timeout expired"),
            JobFailure::MemoryLimit => write!(f, "Memory limit exceeded"),
            JobFailure::MalformedOutput { .. } => write!(f, "Unparseable output"),
            JobFailure::MissingKeys { .. } => write!(f, "Required keys missing"),
            JobFailure::Subprocess { .. } => write!(f, "Subprocess error"),
            JobFailure::Unexpected { .. } => write!(f, "Unexpected error"),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn timeout_error_object_carries_the_command() {
        let object = JobFailure::TimeLimit.to_error_object("greedy_spanner -t 1.5");
        assert_eq!(object["command"], "greedy_spanner -t 1.5");
        assert_eq!(object["error"], "Time limit exceeded.");
        assert!(object.get("output").is_none());
    }

    #[test]
    fn malformed_output_error_object_preserves_raw_stdout() {
        let failure = JobFailure::MalformedOutput {
            output: String::from("not json"),
        };
        let object = failure.to_error_object("prog");
        assert_eq!(object["output"], "not json");
        assert!(
            object["error"]
                .as_str()
                .expect("No error string")
                .contains("can't be parsed")
        );
    }

    #[test]
    fn subprocess_error_object_uses_the_raw_detail() {
        let failure = JobFailure::Subprocess {
            detail: String::from("segmentation fault"),
        };
        let object = failure.to_error_object("prog");
        assert_eq!(object["error"], "segmentation fault");
    }
}
