//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to a Riak node.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The node could not be reached or the transport failed mid-request.
    #[error("riak server not available: {0}")]
    Unavailable(String),

    /// The node answered with a status the operation does not expect.
    #[error("unexpected response from riak ({status}): {body}")]
    Api { status: u16, body: String },

    /// The key holds concurrent siblings (HTTP 300).
    #[error("object {bucket}/{key} has siblings")]
    Siblings { bucket: String, key: String },

    /// A write was stored, but the key now holds siblings (HTTP 300 on a
    /// `returnbody` write). `key` is `None` when a create's reply carried no
    /// `Location`.
    #[error("write to {bucket} was stored but left siblings (key {key:?})")]
    WriteSiblings { bucket: String, key: Option<String> },

    /// A conditional write found the object changed since it was fetched.
    #[error("write conflict on {bucket}/{key}: object changed since it was fetched")]
    Conflict { bucket: String, key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The node returned something that cannot be decoded into the model,
    /// or an object cannot be encoded onto the wire.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Model(#[from] riak_types::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the node was unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// Returns true if the write reached the node even though an error was
    /// returned.
    pub fn write_was_stored(&self) -> bool {
        matches!(self, StoreError::WriteSiblings { .. })
    }

    /// Returns true if a conditional write lost a race.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
