use crate::error::{ConnectorError, ConnectorResult};
use crate::options::InsertOptions;
use riak_client::{HttpStore, IndexQuery, RiakConfig, RiakStore, StoreResult};
use riak_types::{
    AutoIndex, AutoIndexRemoval, Document, IndexRemoval, IndexValue, Link, LinkRemoval,
    RiakObject, SecondaryIndex,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Logs a store failure once, where it crosses into the connector.
fn logged<T>(operation: &str, result: StoreResult<T>) -> ConnectorResult<T> {
    result.map_err(|e| {
        warn!("{} failed: {}", operation, e);
        ConnectorError::Store(e)
    })
}

/// Removes repeated keys, keeping first-seen order.
fn dedup_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|key| seen.insert(key.clone())).collect()
}

/// CRUD, index and link operations against one Riak node.
///
/// Cloning is cheap; clones share the underlying store.
#[derive(Clone)]
pub struct Connector {
    store: Arc<dyn RiakStore>,
}

impl Connector {
    /// Connects to the node at `host:port` over HTTP with default settings.
    pub fn connect(host: &str, port: u16) -> ConnectorResult<Self> {
        Self::with_config(RiakConfig::new(host, port))
    }

    pub fn with_config(config: RiakConfig) -> ConnectorResult<Self> {
        let store = HttpStore::new(config)?;
        info!("Riak connector configured for {}", store.node());
        Ok(Self::with_store(store))
    }

    /// Wraps any store backend, e.g. a [`riak_client::MemoryStore`].
    pub fn with_store(store: impl RiakStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_shared(store: Arc<dyn RiakStore>) -> Self {
        Self { store }
    }

    pub fn node(&self) -> &str {
        self.store.node()
    }

    pub async fn ping(&self) -> ConnectorResult<()> {
        logged("ping", self.store.ping().await)
    }

    // ── Insert ──────────────────────────────────────────────────────

    /// Stores `data` in `bucket` and returns the key it was stored under.
    ///
    /// Every link target must already exist. With no `options.id` the store
    /// assigns the key.
    pub async fn insert(
        &self,
        bucket: &str,
        data: Document,
        options: InsertOptions,
    ) -> ConnectorResult<String> {
        let mut object = RiakObject::new(bucket, options.id, data);
        for index in options.auto_indexes {
            object.add_auto_index(index);
        }
        for index in options.indexes {
            object.add_index(index);
        }
        self.ensure_link_targets(&options.links).await?;
        for link in options.links {
            object.add_link(link);
        }

        let stored = self.store_object(&object).await?;
        stored.key.ok_or_else(|| {
            ConnectorError::InvalidArgument(format!(
                "store returned no key for insert into {bucket}"
            ))
        })
    }

    /// Stores an object the caller has modified locally, echoing its causal
    /// context. Returns the object as stored.
    pub async fn save(&self, object: &RiakObject) -> ConnectorResult<RiakObject> {
        self.store_object(object).await
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub async fn find_one(&self, bucket: &str, key: &str) -> ConnectorResult<Option<Document>> {
        Ok(self.find_one_object(bucket, key).await?.map(|object| object.data))
    }

    /// Like [`find_one`](Self::find_one), but returns the document as JSON text.
    pub async fn find_one_json(&self, bucket: &str, key: &str) -> ConnectorResult<Option<String>> {
        match self.find_one(bucket, key).await? {
            Some(document) => Ok(Some(document.to_json().map_err(|e| {
                ConnectorError::InvalidArgument(format!("document is not serializable: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    /// Fetches the full object, including links, indexes and causal context.
    pub async fn find_one_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> ConnectorResult<Option<RiakObject>> {
        logged("fetch", self.store.fetch(bucket, key).await)
    }

    pub async fn find_all(&self, bucket: &str) -> ConnectorResult<Vec<Document>> {
        Ok(into_documents(self.find_all_objects(bucket).await?))
    }

    /// Lists the bucket and fetches every key. Keys deleted in between are
    /// skipped.
    pub async fn find_all_objects(&self, bucket: &str) -> ConnectorResult<Vec<RiakObject>> {
        let keys = logged("list keys", self.store.list_keys(bucket).await)?;
        self.resolve(bucket, keys).await
    }

    pub async fn find_by_index(
        &self,
        bucket: &str,
        name: &str,
        value: impl Into<IndexValue>,
    ) -> ConnectorResult<Vec<Document>> {
        Ok(into_documents(self.find_by_index_objects(bucket, name, value).await?))
    }

    pub async fn find_by_index_objects(
        &self,
        bucket: &str,
        name: &str,
        value: impl Into<IndexValue>,
    ) -> ConnectorResult<Vec<RiakObject>> {
        let query = IndexQuery::exact(name, value);
        let keys = logged("index query", self.store.index_query(bucket, &query).await)?;
        self.resolve(bucket, dedup_keys(keys)).await
    }

    /// Range query over `start..=end`. With `duplicates` false, a key that
    /// matches several terms is returned once.
    pub async fn find_by_index_range(
        &self,
        bucket: &str,
        name: &str,
        start: impl Into<IndexValue>,
        end: impl Into<IndexValue>,
        duplicates: bool,
    ) -> ConnectorResult<Vec<Document>> {
        Ok(into_documents(
            self.find_by_index_range_objects(bucket, name, start, end, duplicates)
                .await?,
        ))
    }

    pub async fn find_by_index_range_objects(
        &self,
        bucket: &str,
        name: &str,
        start: impl Into<IndexValue>,
        end: impl Into<IndexValue>,
        duplicates: bool,
    ) -> ConnectorResult<Vec<RiakObject>> {
        let query = IndexQuery::range(name, start, end)
            .map_err(|e| ConnectorError::InvalidArgument(e.to_string()))?;
        let mut keys = logged("index query", self.store.index_query(bucket, &query).await)?;
        if !duplicates {
            keys = dedup_keys(keys);
        }
        self.resolve(bucket, keys).await
    }

    /// Fetches every object `object` links to, optionally only those with a
    /// given tag and/or in a given bucket. Missing targets are skipped.
    pub async fn linked_objects(
        &self,
        object: &RiakObject,
        tag: Option<&str>,
        bucket: Option<&str>,
    ) -> ConnectorResult<Vec<RiakObject>> {
        let mut linked = Vec::new();
        for link in object.links_matching(tag, bucket) {
            match self.find_one_object(&link.bucket, &link.key).await? {
                Some(target) => linked.push(target),
                None => debug!("Link target {}/{} is gone", link.bucket, link.key),
            }
        }
        Ok(linked)
    }

    /// Full-text query against a search index; returns the matching docs.
    pub async fn search(
        &self,
        index: &str,
        query: &str,
    ) -> ConnectorResult<Vec<serde_json::Value>> {
        logged("search", self.store.search(index, query).await)
    }

    // ── Read-modify-write ───────────────────────────────────────────

    /// Overwrites the stored fields that also appear in `updates`; other
    /// entries of `updates` are ignored. Returns how many fields changed.
    pub async fn update(
        &self,
        bucket: &str,
        key: &str,
        updates: &Document,
    ) -> ConnectorResult<usize> {
        let mut overwritten = 0;
        self.modify(bucket, key, |object| {
            overwritten = object.data.update_existing(updates);
        })
        .await?;
        Ok(overwritten)
    }

    /// Merges `data` into the stored document, replacing values on collision.
    pub async fn add_fields(&self, bucket: &str, key: &str, data: Document) -> ConnectorResult<()> {
        self.modify(bucket, key, |object| object.data.merge(data)).await?;
        Ok(())
    }

    /// Deletes the named fields. Returns how many were present.
    pub async fn remove_fields<I, S>(
        &self,
        bucket: &str,
        key: &str,
        fields: I,
    ) -> ConnectorResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        self.modify(bucket, key, |object| {
            removed = object.data.remove_fields(fields);
        })
        .await?;
        Ok(removed)
    }

    /// Deletes `bucket/key`. Returns false if nothing was stored there.
    pub async fn remove(&self, bucket: &str, key: &str) -> ConnectorResult<bool> {
        let Some(object) = self.find_one_object(bucket, key).await? else {
            debug!("Nothing to remove at {}/{}", bucket, key);
            return Ok(false);
        };
        logged(
            "delete",
            self.store.delete(bucket, key, object.vclock.as_deref()).await,
        )
    }

    pub async fn add_links(
        &self,
        bucket: &str,
        key: &str,
        links: Vec<Link>,
    ) -> ConnectorResult<()> {
        self.ensure_link_targets(&links).await?;
        self.modify(bucket, key, |object| {
            for link in links {
                object.add_link(link);
            }
        })
        .await?;
        Ok(())
    }

    /// Returns how many links were dropped.
    pub async fn remove_links(
        &self,
        bucket: &str,
        key: &str,
        removals: &[LinkRemoval],
    ) -> ConnectorResult<usize> {
        let mut removed = 0;
        self.modify(bucket, key, |object| {
            removed = removals.iter().map(|r| object.remove_links(r)).sum();
        })
        .await?;
        Ok(removed)
    }

    pub async fn add_auto_indexes(
        &self,
        bucket: &str,
        key: &str,
        indexes: &[AutoIndex],
    ) -> ConnectorResult<()> {
        self.modify(bucket, key, |object| {
            for index in indexes {
                object.add_auto_index(index.clone());
            }
        })
        .await?;
        Ok(())
    }

    pub async fn remove_auto_indexes(
        &self,
        bucket: &str,
        key: &str,
        removals: &[AutoIndexRemoval],
    ) -> ConnectorResult<usize> {
        let mut removed = 0;
        self.modify(bucket, key, |object| {
            removed = removals.iter().map(|r| object.remove_auto_indexes(r)).sum();
        })
        .await?;
        Ok(removed)
    }

    pub async fn add_indexes(
        &self,
        bucket: &str,
        key: &str,
        indexes: &[SecondaryIndex],
    ) -> ConnectorResult<()> {
        self.modify(bucket, key, |object| {
            for index in indexes {
                object.add_index(index.clone());
            }
        })
        .await?;
        Ok(())
    }

    pub async fn remove_indexes(
        &self,
        bucket: &str,
        key: &str,
        removals: &[IndexRemoval],
    ) -> ConnectorResult<usize> {
        let mut removed = 0;
        self.modify(bucket, key, |object| {
            removed = removals.iter().map(|r| object.remove_indexes(r)).sum();
        })
        .await?;
        Ok(removed)
    }

    // ── Internals ───────────────────────────────────────────────────

    /// Fetch, apply `change`, store. The fetched causal context travels with
    /// the object, so the store sees which version the change was based on.
    async fn modify<F>(&self, bucket: &str, key: &str, change: F) -> ConnectorResult<RiakObject>
    where
        F: FnOnce(&mut RiakObject),
    {
        let mut object = self
            .find_one_object(bucket, key)
            .await?
            .ok_or_else(|| ConnectorError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;
        change(&mut object);
        self.store_object(&object).await
    }

    async fn store_object(&self, object: &RiakObject) -> ConnectorResult<RiakObject> {
        logged("store", self.store.store(object).await)
    }

    async fn ensure_link_targets(&self, links: &[Link]) -> ConnectorResult<()> {
        for link in links {
            if self.find_one_object(&link.bucket, &link.key).await?.is_none() {
                return Err(ConnectorError::LinkTargetNotFound {
                    bucket: link.bucket.clone(),
                    key: link.key.clone(),
                });
            }
        }
        Ok(())
    }

    async fn resolve(&self, bucket: &str, keys: Vec<String>) -> ConnectorResult<Vec<RiakObject>> {
        let mut objects = Vec::with_capacity(keys.len());
        for key in keys {
            match self.find_one_object(bucket, &key).await? {
                Some(object) => objects.push(object),
                None => debug!("Key {}/{} vanished before it could be fetched", bucket, key),
            }
        }
        Ok(objects)
    }
}

fn into_documents(objects: Vec<RiakObject>) -> Vec<Document> {
    objects.into_iter().map(|object| object.data).collect()
}
