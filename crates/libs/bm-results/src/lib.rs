//! Job and result model for the BM harness.
//!
//! Defines the `Job` record handed to workers, the classified
//! `ExecutionOutcome` of running one job, and the `ResultRecord`
//! fragments persisted into the aggregate output file. The classifier
//! turns a raw process outcome into exactly one of these.

pub mod classify;
pub mod job;
pub mod outcome;
pub mod record;

pub use classify::classify;
pub use job::Job;
pub use outcome::{ExecutionOutcome, JobFailure};
pub use record::ResultRecord;
