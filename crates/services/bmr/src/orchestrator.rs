//! Run wiring: queue, worker pool, aggregator, shutdown.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, channel};
use std::thread;
use std::time::{Duration, Instant};

use bm_config::run_config::BmRunConfig;
use bm_io::runner::ResourceLimits;
use bm_results::record::ResultRecord;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::prelude::*;
use crate::queue::JobQueue;
use crate::worker::{effective_worker_count, spawn_workers};

/// Execute the full benchmark run described by `config`.
///
/// Blocks until every job reached a terminal outcome or the run was
/// interrupted; in both cases the output file is finalized into a
/// complete JSON object before this returns. Returns the elapsed wall
/// time of the run.
pub async fn run(config: BmRunConfig) -> Result<Duration> {
    let started = Instant::now();

    let worker_count = effective_worker_count(config.requested_workers);
    info!(
        "Running {} commands on {} workers",
        config.commands.len(),
        worker_count
    );

    let (record_tx, record_rx) = channel();
    let aggregator = Aggregator::start(&config.output_path, record_rx)?;

    let queue = Arc::new(JobQueue::new(&config.commands));
    let limits = ResourceLimits {
        time_limit: config.time_limit,
        memory_limit_mb: config.memory_limit_mb,
    };
    let stop = Arc::new(AtomicBool::new(false));

    let workers = spawn_workers(
        worker_count,
        Arc::clone(&queue),
        limits,
        record_tx,
        Arc::clone(&stop),
    );

    // Workers are OS threads; bridge their completion into the async
    // shutdown selection below.
    let (done_tx, mut done_rx) = oneshot::channel();
    let joiner = thread::spawn(move || {
        for worker in workers {
            let _ = worker.join();
        }
        let _ = done_tx.send(());
    });

    tokio::select! {
        _ = &mut done_rx => {
            info!("All workers finished");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Run manually aborted. Some tests might not be finished.");
            stop.store(true, Ordering::Relaxed);
            let _ = done_rx.await;
        }
    }
    let _ = joiner.join();

    let (path, leftover) = aggregator.stop();
    finalize_output(&path, leftover)?;
    info!("Finished writing to {}", path.display());

    Ok(started.elapsed())
}

/// Close the aggregate output file.
///
/// Appends any record the writer did not get to (the writer has stopped
/// by now, so this is the only remaining writer) and the closing brace
/// that turns the file into a complete JSON object.
pub fn finalize_output(path: &Path, leftover: Option<Receiver<ResultRecord>>) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    if let Some(rx) = leftover {
        while let Ok(record) = rx.try_recv() {
            file.write_all(record.to_fragment().as_bytes())?;
        }
    }
    file.write_all(b"}")?;
    file.flush()
}
