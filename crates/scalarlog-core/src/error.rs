//! Error types for scalarlog-core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScalarLogError {
    /// A directory or event file could not be created, written or flushed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed caller input. Logger state is left untouched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A precondition on logger or derived-metric state does not hold.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("event decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("corrupt event file: {0}")]
    Corrupt(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ScalarLogError>;
