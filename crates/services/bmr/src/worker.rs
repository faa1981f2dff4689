//! Worker pool: claim jobs, run them, classify, hand off results.
//!
//! Workers never communicate with each other; the job queue is the only
//! contention point and the result channel is a one-way hand-off to the
//! output writer. No per-job error ever escapes a worker: every job a
//! worker completes produces exactly one result record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use bm_io::runner::{ResourceLimits, Runner};
use bm_results::classify::classify;
use bm_results::job::Job;
use bm_results::outcome::{ExecutionOutcome, JobFailure};
use bm_results::record::ResultRecord;
use tracing::{debug, error, info, warn};

use crate::queue::JobQueue;

/// Compute the number of workers actually started.
///
/// One unit of parallelism is reserved so the host's other activity is
/// not starved; at least one worker always runs.
pub fn effective_worker_count(requested: usize) -> usize {
    let available = thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1);
    let ceiling = available.saturating_sub(1).max(1);
    if requested > ceiling {
        warn!("Less CPUs are available than requested: using {ceiling} of {requested} workers");
    }
    requested.min(ceiling).max(1)
}

/// Spawn the worker pool.
///
/// Each worker loops taking jobs from the queue until it is exhausted or
/// the stop flag is raised. The passed `tx` is cloned per worker; once
/// all workers terminate the result channel disconnects, which signals
/// the output writer that no more records will arrive.
pub fn spawn_workers(
    count: usize,
    queue: Arc<JobQueue>,
    limits: ResourceLimits,
    tx: Sender<ResultRecord>,
    stop: Arc<AtomicBool>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|worker_id| {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || worker_loop(worker_id, &queue, &limits, &tx, &stop))
        })
        .collect()
}

fn worker_loop(
    worker_id: usize,
    queue: &JobQueue,
    limits: &ResourceLimits,
    tx: &Sender<ResultRecord>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::Relaxed) {
        let Some(job) = queue.take() else {
            break;
        };
        let Some(record) = execute_job(&job, limits, stop) else {
            // The in-flight child was terminated by shutdown; results of
            // jobs that already completed are preserved.
            warn!("Test {} aborted. {}", job.index, job.command);
            break;
        };
        if tx.send(record).is_err() {
            error!("Result channel closed, worker {worker_id} stopping");
            break;
        }
    }
    debug!("Worker {worker_id} terminated");
}

/// Run and classify one job.
///
/// Returns `None` only when the job was cut short by shutdown; every
/// other path, including unexpected per-job errors, yields a record.
fn execute_job(job: &Job, limits: &ResourceLimits, stop: &AtomicBool) -> Option<ResultRecord> {
    let outcome = match Runner::from_command_line(&job.command) {
        Some(runner) => {
            let raw = runner.run(limits, stop);
            if raw.interrupted {
                return None;
            }
            classify(job, &raw)
        }
        None => ExecutionOutcome::Failure(JobFailure::Unexpected {
            detail: String::from("Empty command line"),
        }),
    };

    match &outcome {
        ExecutionOutcome::Success { .. } => {
            info!("Test {} finished. {}", job.index, job.command);
        }
        ExecutionOutcome::Failure(failure) => {
            info!("Test {} didn't finish. {failure}. {}", job.index, job.command);
        }
    }
    Some(ResultRecord::from_outcome(job, &outcome))
}
