//! In-memory store implementation.
//!
//! Keeps objects in process memory and records every call it receives. The
//! connector tests use it as the test double for a Riak node; it follows the
//! same contract as [`HttpStore`](crate::HttpStore), including
//! server-assigned keys, causal context and conditional writes.

use crate::error::{StoreError, StoreResult};
use crate::store::{IndexQuery, RiakStore};
use async_trait::async_trait;
use riak_types::{IndexValue, RiakObject};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// One call received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Ping,
    Fetch { bucket: String, key: String },
    /// `key` is `None` for a create with a server-assigned key.
    Store { bucket: String, key: Option<String> },
    Delete { bucket: String, key: String },
    ListKeys { bucket: String },
    IndexQuery { bucket: String, query: IndexQuery },
    Search { index: String, query: String },
}

#[derive(Debug, Clone)]
struct Stored {
    object: RiakObject,
    version: u64,
}

type Buckets = BTreeMap<String, BTreeMap<String, Stored>>;

/// In-memory Riak store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    buckets: Arc<RwLock<Buckets>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    conditional_writes: bool,
    /// When set, every call fails as if the node were down.
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes whose etag no longer matches.
    pub fn with_conditional_writes() -> Self {
        Self {
            conditional_writes: true,
            ..Self::default()
        }
    }

    /// Simulates the node going down (`true`) or coming back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every call received so far, oldest first.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    /// Number of objects currently stored in a bucket.
    pub async fn len(&self, bucket: &str) -> usize {
        self.buckets.read().await.get(bucket).map_or(0, BTreeMap::len)
    }

    async fn record(&self, call: StoreCall) -> StoreResult<()> {
        self.calls.lock().await.push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn context(version: u64) -> (String, String) {
    (format!("vclock-{version}"), format!("\"{version}\""))
}

/// Naive matcher for `field:value` clauses joined by ` OR `; `*:*` matches
/// everything.
fn search_matches(object: &RiakObject, query: &str) -> bool {
    query.split(" OR ").map(str::trim).any(|clause| {
        if clause == "*:*" {
            return true;
        }
        let Some((field, wanted)) = clause.split_once(':') else {
            return false;
        };
        let wanted = wanted.trim_matches('"');
        match object.data.get(field) {
            Some(serde_json::Value::String(s)) => s == wanted,
            Some(other) => other.to_string() == wanted,
            None => false,
        }
    })
}

#[async_trait]
impl RiakStore for MemoryStore {
    fn node(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.record(StoreCall::Ping).await
    }

    async fn fetch(&self, bucket: &str, key: &str) -> StoreResult<Option<RiakObject>> {
        self.record(StoreCall::Fetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
        .await?;

        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|stored| stored.object.clone()))
    }

    async fn store(&self, object: &RiakObject) -> StoreResult<RiakObject> {
        self.record(StoreCall::Store {
            bucket: object.bucket.clone(),
            key: object.key.clone(),
        })
        .await?;

        let key = object
            .key
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        let mut buckets = self.buckets.write().await;
        let objects = buckets.entry(object.bucket.clone()).or_default();

        let previous = objects.get(&key).map(|stored| stored.version);
        if self.conditional_writes {
            if let (Some(version), Some(etag)) = (previous, &object.etag) {
                if *etag != context(version).1 {
                    return Err(StoreError::Conflict {
                        bucket: object.bucket.clone(),
                        key,
                    });
                }
            }
        }

        let version = previous.map_or(1, |v| v + 1);
        let (vclock, etag) = context(version);

        let mut stored = object.clone();
        stored.key = Some(key.clone());
        stored.vclock = Some(vclock);
        stored.etag = Some(etag);

        debug!("Stored {}/{} at version {}", object.bucket, key, version);
        objects.insert(
            key,
            Stored {
                object: stored.clone(),
                version,
            },
        );
        Ok(stored)
    }

    async fn delete(&self, bucket: &str, key: &str, _vclock: Option<&str>) -> StoreResult<bool> {
        self.record(StoreCall::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
        .await?;

        let mut buckets = self.buckets.write().await;
        Ok(buckets
            .get_mut(bucket)
            .is_some_and(|objects| objects.remove(key).is_some()))
    }

    async fn list_keys(&self, bucket: &str) -> StoreResult<Vec<String>> {
        self.record(StoreCall::ListKeys {
            bucket: bucket.to_string(),
        })
        .await?;

        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Exact queries return each key once, ordered by key. Range queries
    /// return one key per matching term, ordered by `(term, key)`, so an
    /// object with several terms in range appears several times.
    async fn index_query(&self, bucket: &str, query: &IndexQuery) -> StoreResult<Vec<String>> {
        self.record(StoreCall::IndexQuery {
            bucket: bucket.to_string(),
            query: query.clone(),
        })
        .await?;

        let buckets = self.buckets.read().await;
        let Some(objects) = buckets.get(bucket) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(IndexValue, String)> = Vec::new();
        for (key, stored) in objects {
            let terms = stored
                .object
                .effective_indexes()
                .into_iter()
                .filter(|index| index.name == query.name() && query.matches(&index.value));
            match query {
                IndexQuery::Exact { value, .. } => {
                    if terms.count() > 0 {
                        hits.push((value.clone(), key.clone()));
                    }
                }
                IndexQuery::Range { .. } => {
                    hits.extend(terms.map(|index| (index.value, key.clone())));
                }
            }
        }
        hits.sort();
        Ok(hits.into_iter().map(|(_, key)| key).collect())
    }

    /// Treats the search index name as a bucket name.
    async fn search(&self, index: &str, query: &str) -> StoreResult<Vec<serde_json::Value>> {
        self.record(StoreCall::Search {
            index: index.to_string(),
            query: query.to_string(),
        })
        .await?;

        let buckets = self.buckets.read().await;
        let Some(objects) = buckets.get(index) else {
            return Ok(Vec::new());
        };

        Ok(objects
            .iter()
            .filter(|(_, stored)| search_matches(&stored.object, query))
            .map(|(key, stored)| {
                let mut doc = stored.object.data.clone().into_map();
                doc.insert("_yz_rk".to_string(), key.clone().into());
                doc.insert("_yz_rb".to_string(), index.into());
                serde_json::Value::Object(doc)
            })
            .collect())
    }
}
