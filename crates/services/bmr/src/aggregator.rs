//! Incremental, crash-resilient output persistence.
//!
//! A dedicated writer thread drains result records onto the output file
//! as they arrive. The file is initialized as an open JSON object and
//! extended one fragment at a time, so at every point of the run it is
//! either a complete object (after the orchestrator's final close) or a
//! valid prefix missing only the closing brace, recoverable by appending
//! `}`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bm_results::record::ResultRecord;
use tracing::{debug, error};

/// How long the writer waits for a record before checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Literal written at initialization; intentionally an open object.
const OPEN_LITERAL: &str = "{\"initialized\": true";

/// Background writer draining result records onto the output file.
///
/// Exactly one writer mutates the file while the run is in progress; the
/// orchestrator only touches it after `stop` has joined the writer.
pub struct Aggregator {
    handle: JoinHandle<Receiver<ResultRecord>>,
    stop: Arc<AtomicBool>,
    path: PathBuf,
}

impl Aggregator {
    /// Initialize the output file and start the writer thread.
    ///
    /// Creates (or truncates) the file and writes the opening literal
    /// before any worker runs, so even an immediately interrupted run
    /// leaves a recoverable file behind.
    pub fn start(path: &Path, rx: Receiver<ResultRecord>) -> io::Result<Self> {
        let mut file = File::create(path)?;
        file.write_all(OPEN_LITERAL.as_bytes())?;
        file.flush()?;

        let stop = Arc::new(AtomicBool::new(false));
        let writer_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || writer_loop(file, rx, &writer_stop));

        Ok(Self {
            handle,
            stop,
            path: path.to_path_buf(),
        })
    }

    /// Stop the writer after one final full drain.
    ///
    /// Hands the channel back so the orchestrator can drain any record
    /// that arrives between the join and the final close. `None` means
    /// the writer thread panicked; whatever it had already written is on
    /// disk and the file is still recoverable.
    pub fn stop(self) -> (PathBuf, Option<Receiver<ResultRecord>>) {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.join() {
            Ok(rx) => (self.path, Some(rx)),
            Err(_) => {
                error!("Output writer thread panicked; residual results are lost");
                (self.path, None)
            }
        }
    }
}

fn writer_loop(
    mut file: File,
    rx: Receiver<ResultRecord>,
    stop: &AtomicBool,
) -> Receiver<ResultRecord> {
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(record) => {
                append_record(&mut file, &record);
                // Drain whatever queued up while writing
                while let Ok(record) = rx.try_recv() {
                    append_record(&mut file, &record);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
            }
            // All workers are done and the channel is empty
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    while let Ok(record) = rx.try_recv() {
        append_record(&mut file, &record);
    }
    let _ = file.flush();
    rx
}

fn append_record(file: &mut File, record: &ResultRecord) {
    debug!("Writing Test{}", record.index);
    if let Err(err) = file.write_all(record.to_fragment().as_bytes()) {
        error!("Failed to write Test{}: {err}", record.index);
    }
}

#[cfg(test)]
mod tests {

    use std::sync::mpsc::channel;

    use ntest::timeout;
    use tempfile::tempdir;

    use super::*;

    #[test]
    #[timeout(10000)]
    fn initializes_the_file_as_an_open_object() {
        let dir = tempdir().expect("Couldn't create temp dir");
        let path = dir.path().join("results.json");
        let (tx, rx) = channel();

        let aggregator = Aggregator::start(&path, rx).expect("Couldn't start aggregator");
        drop(tx);
        aggregator.stop();

        let contents = std::fs::read_to_string(&path).expect("Couldn't read output file");
        assert_eq!(contents, "{\"initialized\": true");
        // Recoverable by appending the closing brace
        let closed: serde_json::Value =
            serde_json::from_str(&format!("{contents}}}")).expect("File is not recoverable");
        assert_eq!(closed["initialized"], true);
    }

    #[test]
    #[timeout(10000)]
    fn drains_records_enqueued_before_stop() {
        let dir = tempdir().expect("Couldn't create temp dir");
        let path = dir.path().join("results.json");
        let (tx, rx) = channel();

        let aggregator = Aggregator::start(&path, rx).expect("Couldn't start aggregator");
        for index in 0..20 {
            let record = ResultRecord {
                index,
                body: format!("{{\"runtime\": {index}}}"),
            };
            tx.send(record).expect("Couldn't send record");
        }
        let (path, leftover) = aggregator.stop();
        assert!(leftover.is_some());

        let contents = std::fs::read_to_string(&path).expect("Couldn't read output file");
        let closed: serde_json::Value =
            serde_json::from_str(&format!("{contents}}}")).expect("File is not recoverable");
        let object = closed.as_object().expect("Output is not an object");
        // initialized plus every record sent before the stop
        assert_eq!(object.len(), 21);
    }
}
