//! Error types for connector operations.

use riak_client::StoreError;
use thiserror::Error;

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Errors that can occur in connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The store rejected or failed the request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A read-modify-write operation found nothing under the key.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// A link points at an object that does not exist.
    #[error("link target not found: {bucket}/{key}")]
    LinkTargetNotFound { bucket: String, key: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConnectorError {
    /// Returns true if the node was unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ConnectorError::Store(e) if e.is_unavailable())
    }

    /// Returns true if the write reached the node despite the error, e.g.
    /// when it left siblings.
    pub fn write_was_stored(&self) -> bool {
        matches!(self, ConnectorError::Store(e) if e.write_was_stored())
    }

    /// Returns true if a conditional write lost a race.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ConnectorError::Store(e) if e.is_conflict())
    }
}
