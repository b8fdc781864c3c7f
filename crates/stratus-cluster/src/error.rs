//! Error types for the status client and wire codec.

use thiserror::Error;

/// A response that could not be turned into a snapshot.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid server identity in {field}: {source}")]
    Identity {
        field: &'static str,
        #[source]
        source: stratus_core::CoreError,
    },

    #[error("live server entry without a server name")]
    MissingServerName,
}

/// Result type alias for status client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced to callers of the status client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid master endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("failed to connect to master: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("status RPC failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("failed to decode status response: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to start client runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("status request cancelled")]
    Cancelled,
}
