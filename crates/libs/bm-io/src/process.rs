//! Low-level process management utilities.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};

/// Current status of a running process.
pub enum ProcessStatus {
    /// Process has completed with exit status.
    Done(ExitStatus),
    /// Process is still running.
    Running,
}

/// Spawn a new process with piped stdout and stderr and an address-space
/// ceiling.
///
/// The ceiling is installed between fork and exec, so it holds from the
/// child's first instruction. stdin is closed: benchmark commands must
/// not wait for input.
///
/// # Arguments
///
/// * `program` - Program to execute
/// * `args` - Command line arguments
/// * `memory_limit_mb` - Address-space ceiling in megabytes
///
/// # Returns
///
/// Returns a `Result<Child, io::Error>` - the spawned process or an error.
pub fn spawn_process(program: &str, args: &[String], memory_limit_mb: u64) -> io::Result<Child> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    apply_memory_ceiling(&mut command, memory_limit_mb);
    command.spawn()
}

#[cfg(unix)]
fn apply_memory_ceiling(command: &mut Command, memory_limit_mb: u64) {
    use std::os::unix::process::CommandExt;

    let limit_bytes = memory_limit_mb.saturating_mul(1_000_000);
    // SAFETY: set_address_space_limit is async-signal-safe, which is all
    // the fork-to-exec window allows.
    unsafe {
        command.pre_exec(move || set_address_space_limit(limit_bytes));
    }
}

#[cfg(unix)]
fn set_address_space_limit(limit_bytes: u64) -> io::Result<()> {
    let limit = libc::rlimit {
        rlim_cur: limit_bytes as libc::rlim_t,
        rlim_max: libc::RLIM_INFINITY,
    };
    unsafe {
        if libc::setrlimit(libc::RLIMIT_AS, &limit) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_memory_ceiling(_command: &mut Command, _memory_limit_mb: u64) {}

/// Check process status without blocking.
///
/// # Arguments
///
/// * `child` - Mutable reference to the child process
///
/// # Returns
///
/// Returns a `Result<ProcessStatus, io::Error>` indicating the current
/// process state.
pub fn get_process_status(child: &mut Child) -> io::Result<ProcessStatus> {
    match child.try_wait()? {
        Some(exit_status) => Ok(ProcessStatus::Done(exit_status)),
        None => Ok(ProcessStatus::Running),
    }
}

/// Terminate a child process and reap it.
///
/// Killing a process that already exited reports `InvalidInput`; the
/// child is reaped either way, so that case is not an error here.
///
/// # Arguments
///
/// * `child` - Mutable reference to the child process
///
/// # Returns
///
/// Returns a `Result<ExitStatus, io::Error>` with the process exit status.
pub fn stop_child(child: &mut Child) -> io::Result<ExitStatus> {
    match child.kill() {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::InvalidInput => {}
        Err(err) => return Err(err),
    }
    child.wait()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn spawn_missing_program_fails() {
        let result = spawn_process("bm-no-such-program", &[], 512);
        assert!(result.is_err());
    }

    #[test]
    fn status_of_finished_process_is_done() {
        let mut child =
            spawn_process("true", &[], 512).expect("Couldn't spawn process");
        let exit_status = child.wait().expect("Couldn't wait for process");
        assert!(exit_status.success());
        assert!(matches!(
            get_process_status(&mut child),
            Ok(ProcessStatus::Done(_))
        ));
    }

    #[test]
    fn stop_child_reaps_a_running_process() {
        let args = vec![String::from("60")];
        let mut child = spawn_process("sleep", &args, 512).expect("Couldn't spawn process");
        let exit_status = stop_child(&mut child).expect("Couldn't stop process");
        assert!(!exit_status.success());
    }

    #[test]
    fn stop_child_tolerates_an_exited_process() {
        let mut child = spawn_process("true", &[], 512).expect("Couldn't spawn process");
        child.wait().expect("Couldn't wait for process");
        assert!(stop_child(&mut child).is_ok());
    }
}
