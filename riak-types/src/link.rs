use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named, directed reference to another stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    /// The link name (Riak's `riaktag`).
    pub tag: String,
    pub bucket: String,
    pub key: String,
}

impl Link {
    pub fn new(tag: impl Into<String>, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether this link passes an optional tag and bucket filter.
    #[must_use]
    pub fn matches(&self, tag: Option<&str>, bucket: Option<&str>) -> bool {
        tag.is_none_or(|t| t == self.tag) && bucket.is_none_or(|b| b == self.bucket)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.tag, self.bucket, self.key)
    }
}

/// Parses `tag:bucket:key`. The key may itself contain `:`.
impl FromStr for Link {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(tag), Some(bucket), Some(key))
                if !tag.is_empty() && !bucket.is_empty() && !key.is_empty() =>
            {
                Ok(Self::new(tag, bucket, key))
            }
            _ => Err(Error::InvalidDescriptor(format!(
                "expected tag:bucket:key, got {s:?}"
            ))),
        }
    }
}

/// Selects which links to drop from an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRemoval {
    All,
    /// Every link carrying this tag.
    Tag(String),
    Exact(Link),
}

impl LinkRemoval {
    #[must_use]
    pub fn matches(&self, link: &Link) -> bool {
        match self {
            LinkRemoval::All => true,
            LinkRemoval::Tag(tag) => link.tag == *tag,
            LinkRemoval::Exact(exact) => exact == link,
        }
    }
}
