//! Common types and utilities.

/// BM Runner error type.
pub use crate::error::Error;

/// BM Runner result type.
pub type Result<T> = core::result::Result<T, Error>;
