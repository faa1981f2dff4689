//! Configuration management for the BM harness.
//!
//! Provides types and utilities for loading and validating run
//! configurations from JSON input documents.
//!
//! # Usage
//!
//! ```rust
//! use bm_config::{BmRunConfig, BmUserConfig};
//!
//! let document = r#"{
//!     "time_limit": 5000,
//!     "memory_limit": 512,
//!     "number_processes": 4,
//!     "output_filename": "results.json",
//!     "commands": ["spanner_bench -n 100"]
//! }"#;
//!
//! // Decode the user-facing document
//! let user_config = BmUserConfig::from_json(document).unwrap();
//!
//! // Convert to the internal configuration
//! let config = BmRunConfig::from_user_config(user_config);
//! ```

pub mod error;
pub mod prelude;
pub mod run_config;

pub use run_config::{BmRunConfig, BmUserConfig};
