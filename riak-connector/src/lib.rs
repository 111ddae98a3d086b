//! A connector for the Riak key-value store.
//!
//! [`Connector`] exposes the usual document operations on top of a single
//! Riak node:
//!
//! - **Insert** a document with optional key, auto indexes, secondary
//!   indexes and links
//! - **Find** by key, by bucket, by exact index term or by index range
//! - **Update**, add or remove fields (read-modify-write)
//! - **Remove** an object
//! - **Links and indexes**: add or remove them on a stored object
//! - **Search** a full-text index
//!
//! Every read-modify-write operation fetches the object first and writes it
//! back with the causal context it was fetched with. Set
//! [`RiakConfig::conditional_writes`] to have a concurrent modification fail
//! with a conflict instead of being overwritten.
//!
//! # Example
//!
//! ```
//! use riak_connector::{Connector, InsertOptions};
//! use riak_client::MemoryStore;
//! use riak_types::{AutoIndex, Document};
//! use serde_json::json;
//!
//! # async fn demo() -> riak_connector::ConnectorResult<()> {
//! let connector = Connector::with_store(MemoryStore::new());
//! let data = Document::from_value(json!({"name": "John Smith", "age": 28})).unwrap();
//!
//! let key = connector
//!     .insert("people", data, InsertOptions::new().with_auto_index(AutoIndex::int("age")))
//!     .await?;
//! let found = connector.find_by_index("people", "age", 28).await?;
//! assert_eq!(found.len(), 1);
//! # let _ = key;
//! # Ok(())
//! # }
//! ```

mod connector;
mod error;
mod options;

pub use connector::Connector;
pub use error::{ConnectorError, ConnectorResult};
pub use options::InsertOptions;

pub use riak_client::{HttpStore, MemoryStore, RiakConfig, RiakStore, StoreError};
pub use riak_types;
