//! Job records handed to workers.

use serde::{Deserialize, Serialize};

/// One unit of work: a full command line plus its stable index.
///
/// The index is assigned at enqueue time from the command's position in
/// the run configuration and never changes; results are keyed by it
/// regardless of completion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Position of the command in the run configuration, unique per run.
    pub index: usize,
    /// Full command line, whitespace-tokenized at execution time.
    pub command: String,
}

impl Job {
    /// Create a new job record.
    pub fn new(index: usize, command: impl Into<String>) -> Self {
        Self {
            index,
            command: command.into(),
        }
    }
}
