use riak_types::{AutoIndex, Link, SecondaryIndex};

/// Optional parts of an insert.
///
/// ```
/// use riak_connector::InsertOptions;
/// use riak_types::{AutoIndex, Link, SecondaryIndex};
///
/// let options = InsertOptions::new()
///     .with_id("john")
///     .with_auto_index(AutoIndex::int("age"))
///     .with_index(SecondaryIndex::bin("team", "red"))
///     .with_link(Link::new("friend", "people", "jane"));
/// assert_eq!(options.id.as_deref(), Some("john"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    /// Key to store under. `None` lets the store assign one.
    pub id: Option<String>,
    pub auto_indexes: Vec<AutoIndex>,
    pub indexes: Vec<SecondaryIndex>,
    pub links: Vec<Link>,
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_auto_index(mut self, index: AutoIndex) -> Self {
        self.auto_indexes.push(index);
        self
    }

    pub fn with_index(mut self, index: SecondaryIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }
}
