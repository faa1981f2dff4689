//! Process execution and I/O management for the BM harness.
//!
//! Provides utilities for spawning external benchmark commands under an
//! OS-enforced memory ceiling, supervising them against a wall-clock
//! deadline, and capturing their output.
//!
//! # Usage
//!
//! ```rust
//! use bm_io::runner::{ResourceLimits, Runner};
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//!
//! let runner = Runner::from_command_line("echo hello").unwrap();
//! let limits = ResourceLimits {
//!     time_limit: Duration::from_secs(5),
//!     memory_limit_mb: 512,
//! };
//! let stop = AtomicBool::new(false);
//!
//! let outcome = runner.run(&limits, &stop);
//! assert!(!outcome.timed_out);
//! assert_eq!(outcome.stdout.trim(), "hello");
//! ```

pub mod process;
pub mod runner;

pub use runner::{RawOutcome, ResourceLimits, Runner};
