//! Error types for Stratus core values.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while parsing or validating core values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid server name {0:?}: expected host,port,start_code")]
    InvalidServerName(String),

    #[error("invalid port {0}: must fit in 16 bits")]
    InvalidPort(u64),

    #[error("empty host in server identity")]
    EmptyHost,

    #[error("unknown status category {0:?}")]
    UnknownCategory(String),
}
