//! Core type definitions for the Riak connector.
//!
//! This crate defines the values that flow between the connector and the
//! store backends:
//! - [`Document`]: the JSON field map stored under a key
//! - Index descriptors: [`AutoIndex`] (derived from a document field) and
//!   [`SecondaryIndex`] (maintained by hand)
//! - [`Link`]: a tagged reference to another `(bucket, key)` pair
//! - [`RiakObject`]: a document together with its metadata and causal context
//!
//! None of these types talk to the network. Mutating a [`RiakObject`] only
//! changes the local copy until a backend stores it.

mod document;
mod index;
mod link;
mod object;

pub use document::Document;
pub use index::{
    AutoIndex, AutoIndexRemoval, IndexRemoval, IndexType, IndexValue, SecondaryIndex,
};
pub use link::{Link, LinkRemoval};
pub use object::RiakObject;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or parsing model values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid index type: {0} (expected `int` or `bin`)")]
    InvalidIndexType(String),

    #[error("invalid index value {value:?} for {index_type} index")]
    InvalidIndexValue { index_type: IndexType, value: String },

    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
