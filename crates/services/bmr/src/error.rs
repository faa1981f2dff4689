//! BM Runner error types.

/// BM Runner errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] bm_config::error::Error),
}
