//! Pending-job queue shared by all workers.

use std::collections::VecDeque;
use std::sync::Mutex;

use bm_results::job::Job;

/// Thread-safe FIFO of pending jobs.
///
/// Filled once before the workers start, with capacity for the full job
/// set. `take` is the single point of contention between workers: it
/// atomically hands out the next job or reports exhaustion, so no job is
/// ever handed to two workers and none is lost. Once empty the queue
/// stays empty.
#[derive(Debug)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
}

impl JobQueue {
    /// Build the queue from the configured command lines.
    ///
    /// Each job's index is its position in `commands`, which keys its
    /// entry in the output file regardless of completion order.
    pub fn new(commands: &[String]) -> Self {
        let mut jobs = VecDeque::with_capacity(commands.len());
        for (index, command) in commands.iter().enumerate() {
            jobs.push_back(Job::new(index, command.clone()));
        }
        Self {
            jobs: Mutex::new(jobs),
        }
    }

    /// Take the next pending job, or `None` once the queue is exhausted.
    pub fn take(&self) -> Option<Job> {
        self.jobs
            .lock()
            .expect("Job queue mutex poisoned")
            .pop_front()
    }

    /// Number of jobs still pending.
    pub fn len(&self) -> usize {
        self.jobs.lock().expect("Job queue mutex poisoned").len()
    }

    /// Whether the queue is exhausted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
