//! Error types for the client crate.

use thiserror::Error;
use tonkit_codec::CodecError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while driving requests through the engine.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Encoding or decoding at the wire boundary failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The engine produced nothing across the whole attempt budget.
    #[error("no record received after {attempts} attempts")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The node answered with an `error` record on an operation the client
    /// interprets itself.
    #[error("node error: {0}")]
    Node(String),

    /// Block synchronization failed; carries the raw `error` record.
    #[error("sync failed: {0}")]
    Sync(String),

    /// A reply that had to be `ok` or `error` carried another tag.
    #[error("unexpected reply kind: {0}")]
    UnexpectedReply(String),

    /// One request needed more sync rounds than the configured bound.
    #[error("sync rounds exhausted after {rounds} rounds")]
    SyncRoundsExhausted {
        /// Number of rounds serviced.
        rounds: u32,
    },

    /// The operation was cancelled from another thread.
    #[error("operation cancelled")]
    Cancelled,

    /// The handle was already closed.
    #[error("client is closed")]
    Closed,
}

impl ClientError {
    /// Returns true when the failure means the engine stayed silent.
    pub fn is_silence(&self) -> bool {
        matches!(self, ClientError::RetryExhausted { .. })
    }
}
