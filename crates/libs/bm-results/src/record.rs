//! Result records bound for the aggregate output file.

use crate::job::Job;
use crate::outcome::ExecutionOutcome;

/// Final serialized result of one job.
///
/// Immutable once built; transferred exactly once into the output
/// writer's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// The job's stable index.
    pub index: usize,
    /// Serialized JSON value stored under `"Test<index>"`.
    pub body: String,
}

impl ResultRecord {
    /// Build the record for one classified job outcome.
    pub fn from_outcome(job: &Job, outcome: &ExecutionOutcome) -> Self {
        let value = match outcome {
            ExecutionOutcome::Success { payload } => payload.clone(),
            ExecutionOutcome::Failure(failure) => failure.to_error_object(&job.command),
        };
        Self {
            index: job.index,
            body: value.to_string(),
        }
    }

    /// Render the fragment appended to the aggregate output file.
    ///
    /// The leading comma continues the object opened by the
    /// initialization literal, keeping the file recoverable at every
    /// append boundary.
    pub fn to_fragment(&self) -> String {
        format!(",\n\"Test{}\": {}", self.index, self.body)
    }
}
