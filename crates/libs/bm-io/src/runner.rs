//! Job process runner with wall-clock supervision and output capture.

use std::io::Read;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle, sleep};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::process::{ProcessStatus, get_process_status, spawn_process, stop_child};

/// Poll interval while supervising a running child.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Limits applied to every job process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Wall-clock limit for one job.
    pub time_limit: Duration,
    /// Address-space ceiling in megabytes, in effect before the child
    /// executes any user code.
    pub memory_limit_mb: u64,
}

/// Raw result of running one job process.
///
/// The runner never raises: a failure to spawn is carried in
/// `spawn_error` and interpreted by the caller. Output content is not
/// interpreted here either.
#[derive(Debug, Default)]
pub struct RawOutcome {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Exit status, when the process could be reaped.
    pub exit_status: Option<ExitStatus>,
    /// The wall-clock limit elapsed and the process was terminated.
    pub timed_out: bool,
    /// The process was terminated by the shutdown flag.
    pub interrupted: bool,
    /// The process could not be spawned.
    pub spawn_error: Option<String>,
}

/// Runs one command line under resource limits.
pub struct Runner {
    /// Program to execute.
    program: String,
    /// Command line arguments.
    args: Vec<String>,
}

impl Runner {
    /// Create a new runner with program and arguments.
    pub fn new(program: impl Into<String>, args: Vec<impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(|a| a.into()).collect(),
        }
    }

    /// Create a runner from a full command line.
    ///
    /// The line is split on whitespace; there is no shell metacharacter
    /// interpretation and no quoting support. Returns `None` for a line
    /// without any tokens.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bm_io::runner::Runner;
    ///
    /// let runner = Runner::from_command_line("greedy_spanner -t 1.5").unwrap();
    /// assert_eq!(runner.get_full_command(), "greedy_spanner -t 1.5");
    /// assert!(Runner::from_command_line("   ").is_none());
    /// ```
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let program = tokens.next()?;
        Some(Self {
            program,
            args: tokens.collect(),
        })
    }

    /// Get the full command string with arguments.
    pub fn get_full_command(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", &self.program, &self.args.join(" "))
    }

    fn read_stream<T: Read>(mut stream: T) -> String {
        let mut buffer = Vec::new();
        match stream.read_to_end(&mut buffer) {
            Ok(_) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(_) => String::new(),
        }
    }

    fn launch_stream_reader<T>(stream: T) -> JoinHandle<String>
    where
        T: Read + Send + 'static,
    {
        thread::spawn(move || Runner::read_stream(stream))
    }

    /// Run the process to completion under the given limits.
    ///
    /// Blocks until the process terminates, the wall-clock limit elapses,
    /// or `stop` is raised; in the latter two cases the child is killed
    /// and reaped before this returns. No child process outlives this
    /// call on any path.
    ///
    /// # Arguments
    ///
    /// * `limits` - Wall-clock and address-space limits
    /// * `stop` - Shutdown flag checked while supervising
    pub fn run(&self, limits: &ResourceLimits, stop: &AtomicBool) -> RawOutcome {
        let mut outcome = RawOutcome::default();

        let mut child = match spawn_process(&self.program, &self.args, limits.memory_limit_mb) {
            Ok(child) => child,
            Err(err) => {
                outcome.spawn_error = Some(err.to_string());
                return outcome;
            }
        };

        // Take stdout and stderr and launch a stream reader for each
        let stdout_thread = child.stdout.take().map(Runner::launch_stream_reader);
        let stderr_thread = child.stderr.take().map(Runner::launch_stream_reader);

        let deadline = Instant::now() + limits.time_limit;
        outcome.exit_status = loop {
            if stop.load(Ordering::Relaxed) {
                outcome.interrupted = true;
                break stop_child(&mut child).ok();
            }
            if Instant::now() >= deadline {
                outcome.timed_out = true;
                break stop_child(&mut child).ok();
            }
            match get_process_status(&mut child) {
                Ok(ProcessStatus::Done(exit_status)) => break Some(exit_status),
                Ok(ProcessStatus::Running) => sleep(POLL_INTERVAL),
                Err(err) => {
                    warn!("Lost track of child process: {err}");
                    break stop_child(&mut child).ok();
                }
            }
        };

        // Killing the child closed its pipes, so the readers are at EOF
        if let Some(handle) = stdout_thread {
            outcome.stdout = handle.join().unwrap_or_default();
        }
        if let Some(handle) = stderr_thread {
            outcome.stderr = handle.join().unwrap_or_default();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {

    use std::sync::Arc;

    use ntest::timeout;

    use super::*;

    fn limits(time_limit_ms: u64) -> ResourceLimits {
        ResourceLimits {
            time_limit: Duration::from_millis(time_limit_ms),
            memory_limit_mb: 512,
        }
    }

    #[test]
    #[timeout(5000)]
    fn captures_stdout_of_a_finished_process() {
        let runner = Runner::from_command_line("echo hello").expect("Couldn't build runner");
        let stop = AtomicBool::new(false);

        let outcome = runner.run(&limits(5000), &stop);

        assert_eq!(outcome.stdout.trim(), "hello");
        assert!(outcome.stderr.is_empty());
        assert!(!outcome.timed_out);
        assert!(!outcome.interrupted);
        assert!(outcome.spawn_error.is_none());
        assert!(outcome.exit_status.expect("No exit status").success());
    }

    #[test]
    #[timeout(5000)]
    fn terminates_a_process_past_the_deadline() {
        let runner = Runner::from_command_line("sleep 30").expect("Couldn't build runner");
        let stop = AtomicBool::new(false);

        let started = Instant::now();
        let outcome = runner.run(&limits(200), &stop);

        assert!(outcome.timed_out);
        // The child was killed and reaped well before its natural end
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    #[timeout(5000)]
    fn reports_spawn_errors_instead_of_raising() {
        let runner =
            Runner::from_command_line("bm-no-such-program").expect("Couldn't build runner");
        let stop = AtomicBool::new(false);

        let outcome = runner.run(&limits(1000), &stop);

        assert!(outcome.spawn_error.is_some());
        assert!(outcome.exit_status.is_none());
        assert!(!outcome.timed_out);
    }

    #[test]
    #[timeout(5000)]
    fn captures_stderr_of_a_failing_process() {
        let runner =
            Runner::from_command_line("ls /bm-no-such-directory").expect("Couldn't build runner");
        let stop = AtomicBool::new(false);

        let outcome = runner.run(&limits(5000), &stop);

        assert!(!outcome.stderr.is_empty());
        assert!(!outcome.exit_status.expect("No exit status").success());
    }

    #[test]
    #[timeout(5000)]
    fn stop_flag_interrupts_a_running_process() {
        let runner = Runner::from_command_line("sleep 30").expect("Couldn't build runner");
        let stop = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&stop);
        let trigger = thread::spawn(move || {
            sleep(Duration::from_millis(100));
            flag.store(true, Ordering::Relaxed);
        });

        let outcome = runner.run(&limits(60_000), &stop);

        assert!(outcome.interrupted);
        assert!(!outcome.timed_out);
        trigger.join().expect("Couldn't join trigger thread");
    }

    #[test]
    fn tokenizes_command_lines_without_shell_semantics() {
        let runner = Runner::from_command_line("prog -a   1 'b c'").expect("Couldn't build runner");
        // Quotes are ordinary characters, whitespace always splits
        assert_eq!(runner.get_full_command(), "prog -a 1 'b c'");
    }
}
