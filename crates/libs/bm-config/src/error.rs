//! Configuration error types.

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// JSON deserialization failed, including wrongly typed fields.
    #[error(transparent)]
    Deserialization(#[from] serde_json::Error),
}
