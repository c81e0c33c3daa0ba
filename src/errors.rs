use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::BucketName;

/// Error type for configuration, IO, and sampling invariant failures.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// An input or config file is missing or cannot be opened.
    #[error("input '{}' is unavailable: {reason}", path.display())]
    SourceUnavailable {
        /// Path as given by the caller.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },
    /// Invalid or undecodable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A record was admitted under a bucket with no quota entry.
    #[error("bucket '{0}' is not declared in the quota table")]
    UnknownBucket(BucketName),
    /// Internal accounting no longer adds up; the run must stop.
    #[error("sampling invariant violated: {0}")]
    InvariantViolation(String),
    /// IO failure while reading inputs or writing output.
    #[error(transparent)]
    Io(#[from] io::Error),
}
