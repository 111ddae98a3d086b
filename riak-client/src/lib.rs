//! Store backends for the Riak connector.
//!
//! Everything the connector needs from Riak goes through the [`RiakStore`]
//! trait. Two implementations ship here:
//! - [`HttpStore`] talks to one Riak node over its HTTP interface
//! - [`MemoryStore`] keeps objects in memory and records every call, which
//!   makes it the test double for connector-level tests
//!
//! The HTTP wire mapping (links, index headers, auto index metadata) lives
//! in [`codec`].

pub mod codec;
mod config;
mod error;
pub mod http;
pub mod memory;
mod store;

pub use config::RiakConfig;
pub use error::{StoreError, StoreResult};
pub use http::HttpStore;
pub use memory::{MemoryStore, StoreCall};
pub use store::{IndexQuery, RiakStore};
