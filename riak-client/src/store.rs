//! Riak store abstraction trait.
//!
//! Defines the primitives the connector is built from. Each method maps onto
//! one request against the node.

use crate::error::StoreResult;
use async_trait::async_trait;
use riak_types::{Error as ModelError, IndexType, IndexValue, RiakObject};

/// A secondary index query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexQuery {
    /// Keys with exactly this term.
    Exact { name: String, value: IndexValue },
    /// Keys with a term in `start..=end`. Both bounds share one type.
    Range {
        name: String,
        start: IndexValue,
        end: IndexValue,
    },
}

impl IndexQuery {
    pub fn exact(name: impl AsRef<str>, value: impl Into<IndexValue>) -> Self {
        IndexQuery::Exact {
            name: name.as_ref().to_lowercase(),
            value: value.into(),
        }
    }

    /// Builds a range query, rejecting bounds of different index types.
    pub fn range(
        name: impl AsRef<str>,
        start: impl Into<IndexValue>,
        end: impl Into<IndexValue>,
    ) -> Result<Self, ModelError> {
        let (start, end) = (start.into(), end.into());
        if start.index_type() != end.index_type() {
            return Err(ModelError::InvalidDescriptor(format!(
                "range bounds must share one index type, got {} and {}",
                start.index_type(),
                end.index_type()
            )));
        }
        Ok(IndexQuery::Range {
            name: name.as_ref().to_lowercase(),
            start,
            end,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            IndexQuery::Exact { name, .. } | IndexQuery::Range { name, .. } => name,
        }
    }

    pub fn index_type(&self) -> IndexType {
        match self {
            IndexQuery::Exact { value, .. } => value.index_type(),
            IndexQuery::Range { start, .. } => start.index_type(),
        }
    }

    /// Full index name, e.g. `age_int`.
    pub fn index_name(&self) -> String {
        self.index_type().index_name(self.name())
    }

    /// Whether an index term satisfies this query.
    pub fn matches(&self, value: &IndexValue) -> bool {
        match self {
            IndexQuery::Exact { value: wanted, .. } => wanted == value,
            IndexQuery::Range { start, end, .. } => {
                value.index_type() == start.index_type() && start <= value && value <= end
            }
        }
    }
}

/// Abstract Riak store interface.
#[async_trait]
pub trait RiakStore: Send + Sync {
    /// Human-readable name of the node or backend.
    fn node(&self) -> &str;

    /// Checks that the node is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Fetches the object stored under `bucket/key`, if any.
    async fn fetch(&self, bucket: &str, key: &str) -> StoreResult<Option<RiakObject>>;

    /// Writes an object. When `object.key` is `None` the store assigns a key.
    ///
    /// Returns the object as stored, carrying its key and new causal context.
    /// A write that was accepted but left siblings on the key fails with
    /// [`StoreError::WriteSiblings`](crate::StoreError::WriteSiblings); the
    /// data did reach the node and must not be treated as lost.
    async fn store(&self, object: &RiakObject) -> StoreResult<RiakObject>;

    /// Deletes `bucket/key`. Returns false if nothing was stored there.
    async fn delete(&self, bucket: &str, key: &str, vclock: Option<&str>) -> StoreResult<bool>;

    /// Lists every key in a bucket.
    async fn list_keys(&self, bucket: &str) -> StoreResult<Vec<String>>;

    /// Runs a secondary index query and returns the matching keys as the
    /// store reports them, duplicates included.
    async fn index_query(&self, bucket: &str, query: &IndexQuery) -> StoreResult<Vec<String>>;

    /// Runs a full-text query against a search index.
    async fn search(&self, index: &str, query: &str) -> StoreResult<Vec<serde_json::Value>>;
}
