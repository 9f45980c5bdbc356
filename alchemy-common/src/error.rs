//! Common error types for the alchemy recipe engine

use thiserror::Error;

/// Common result type for alchemy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared by the engine and the HTTP service
#[derive(Error, Debug)]
pub enum Error {
    /// Target or lookup name does not exist in the effective corpus
    #[error("Unknown element: {0}")]
    UnknownElement(String),

    /// Malformed request body, path or query parameter
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Algorithm name outside the accepted set
    #[error("Invalid algorithm: {0}")]
    InvalidAlgorithm(String),

    /// Response or event serialization failed
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Corpus file could not be read or parsed (fatal at startup)
    #[error("Corpus load error: {0}")]
    CorpusLoad(String),

    /// A search worker failed or panicked
    #[error("Internal search error: {0}")]
    InternalSearch(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
