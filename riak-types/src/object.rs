use crate::{
    AutoIndex, AutoIndexRemoval, Document, IndexRemoval, Link, LinkRemoval, SecondaryIndex,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A document stored (or about to be stored) under `bucket/key`, together
/// with its links, indexes and the causal context returned by the last fetch.
///
/// The mutators here only touch the local copy. Nothing reaches the store
/// until a backend writes the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiakObject {
    pub bucket: String,
    /// `None` until the store has assigned or accepted a key.
    pub key: Option<String>,
    pub data: Document,
    pub links: Vec<Link>,
    /// Manually maintained index entries.
    pub indexes: BTreeSet<SecondaryIndex>,
    /// Index declarations whose terms come from `data` at write time.
    pub auto_indexes: BTreeSet<AutoIndex>,
    /// Opaque vector clock echoed back on write.
    pub vclock: Option<String>,
    pub etag: Option<String>,
}

impl RiakObject {
    pub fn new(bucket: impl Into<String>, key: Option<String>, data: Document) -> Self {
        Self {
            bucket: bucket.into(),
            key,
            data,
            links: Vec::new(),
            indexes: BTreeSet::new(),
            auto_indexes: BTreeSet::new(),
            vclock: None,
            etag: None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Adds a link unless an identical one is already present.
    pub fn add_link(&mut self, link: Link) -> bool {
        if self.links.contains(&link) {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Drops every link matching `removal`, returning how many went.
    pub fn remove_links(&mut self, removal: &LinkRemoval) -> usize {
        let before = self.links.len();
        self.links.retain(|link| !removal.matches(link));
        before - self.links.len()
    }

    /// Links passing an optional tag and bucket filter.
    pub fn links_matching<'a>(
        &'a self,
        tag: Option<&'a str>,
        bucket: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |link| link.matches(tag, bucket))
    }

    pub fn add_index(&mut self, index: SecondaryIndex) -> bool {
        self.indexes.insert(index)
    }

    pub fn remove_indexes(&mut self, removal: &IndexRemoval) -> usize {
        let before = self.indexes.len();
        self.indexes.retain(|index| !removal.matches(index));
        before - self.indexes.len()
    }

    pub fn add_auto_index(&mut self, index: AutoIndex) -> bool {
        self.auto_indexes.insert(index)
    }

    pub fn remove_auto_indexes(&mut self, removal: &AutoIndexRemoval) -> usize {
        let before = self.auto_indexes.len();
        self.auto_indexes.retain(|index| !removal.matches(index));
        before - self.auto_indexes.len()
    }

    /// The index entries a write carries: the manual entries plus one entry
    /// per auto index whose field currently has an indexable value.
    #[must_use]
    pub fn effective_indexes(&self) -> BTreeSet<SecondaryIndex> {
        let mut indexes = self.indexes.clone();
        indexes.extend(
            self.auto_indexes
                .iter()
                .filter_map(|auto| auto.derive(&self.data)),
        );
        indexes
    }

    /// Removes from `indexes` the entries the auto indexes would derive from
    /// the current data.
    ///
    /// A fetched object reports derived and manual entries together; without
    /// this step a derived term would linger as a manual entry after its
    /// field changes.
    pub fn strip_derived_indexes(&mut self) {
        let derived: Vec<SecondaryIndex> = self
            .auto_indexes
            .iter()
            .filter_map(|auto| auto.derive(&self.data))
            .collect();
        for index in &derived {
            self.indexes.remove(index);
        }
    }
}
