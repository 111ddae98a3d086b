//! Index descriptors.
//!
//! Riak addresses an index by `{name}_{type}`, where the type suffix is `int`
//! or `bin`. Names are case-insensitive on the server and always come back
//! lowercase, so every descriptor lowercases its name on construction.

use crate::{Document, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The two index encodings Riak supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Integer index (`_int`).
    Int,
    /// Binary/string index (`_bin`).
    Bin,
}

impl IndexType {
    /// The suffix Riak appends to the index name.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            IndexType::Int => "int",
            IndexType::Bin => "bin",
        }
    }

    /// Builds the full `{name}_{suffix}` index name.
    #[must_use]
    pub fn index_name(self, name: &str) -> String {
        format!("{}_{}", name.to_lowercase(), self.suffix())
    }

    /// Splits a full index name such as `age_int` into `("age", Int)`.
    pub fn split_index_name(full: &str) -> Result<(String, Self)> {
        let (name, suffix) = full.rsplit_once('_').ok_or_else(|| {
            Error::InvalidDescriptor(format!("index name without type suffix: {full}"))
        })?;
        if name.is_empty() {
            return Err(Error::InvalidDescriptor(format!("empty index name: {full}")));
        }
        Ok((name.to_lowercase(), suffix.parse()?))
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for IndexType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "int" => Ok(IndexType::Int),
            "bin" => Ok(IndexType::Bin),
            _ => Err(Error::InvalidIndexType(s.to_string())),
        }
    }
}

/// A single index term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    Int(i64),
    Bin(String),
}

impl IndexValue {
    #[must_use]
    pub fn index_type(&self) -> IndexType {
        match self {
            IndexValue::Int(_) => IndexType::Int,
            IndexValue::Bin(_) => IndexType::Bin,
        }
    }

    /// Parses a raw term (as found in a header or on the command line).
    pub fn parse(index_type: IndexType, raw: &str) -> Result<Self> {
        match index_type {
            IndexType::Int => raw
                .trim()
                .parse()
                .map(IndexValue::Int)
                .map_err(|_| Error::InvalidIndexValue {
                    index_type,
                    value: raw.to_string(),
                }),
            IndexType::Bin => Ok(IndexValue::Bin(raw.to_string())),
        }
    }

    /// Derives a term from a document field value.
    ///
    /// `int` accepts integers and numeric strings. `bin` accepts strings and
    /// stringifies numbers and booleans. Anything else yields `None`.
    #[must_use]
    pub fn from_field(index_type: IndexType, value: &Value) -> Option<Self> {
        match (index_type, value) {
            (IndexType::Int, Value::Number(n)) => n.as_i64().map(IndexValue::Int),
            (IndexType::Int, Value::String(s)) => s.trim().parse().ok().map(IndexValue::Int),
            (IndexType::Bin, Value::String(s)) => Some(IndexValue::Bin(s.clone())),
            (IndexType::Bin, Value::Number(n)) => Some(IndexValue::Bin(n.to_string())),
            (IndexType::Bin, Value::Bool(b)) => Some(IndexValue::Bin(b.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Int(v) => write!(f, "{v}"),
            IndexValue::Bin(v) => f.write_str(v),
        }
    }
}

impl From<i64> for IndexValue {
    fn from(v: i64) -> Self {
        IndexValue::Int(v)
    }
}

impl From<i32> for IndexValue {
    fn from(v: i32) -> Self {
        IndexValue::Int(i64::from(v))
    }
}

impl From<&str> for IndexValue {
    fn from(v: &str) -> Self {
        IndexValue::Bin(v.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(v: String) -> Self {
        IndexValue::Bin(v)
    }
}

/// A primary ("auto") index: the index term is taken from a document field
/// every time the object is written, so it follows the field's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AutoIndex {
    /// Document field the term is read from. Case is preserved.
    pub field: String,
    pub index_type: IndexType,
}

impl AutoIndex {
    pub fn new(field: impl Into<String>, index_type: IndexType) -> Self {
        Self {
            field: field.into(),
            index_type,
        }
    }

    pub fn int(field: impl Into<String>) -> Self {
        Self::new(field, IndexType::Int)
    }

    pub fn bin(field: impl Into<String>) -> Self {
        Self::new(field, IndexType::Bin)
    }

    /// Full index name, e.g. `age_int`.
    #[must_use]
    pub fn index_name(&self) -> String {
        self.index_type.index_name(&self.field)
    }

    /// The secondary index entry this auto index contributes for `document`.
    #[must_use]
    pub fn derive(&self, document: &Document) -> Option<SecondaryIndex> {
        let value = IndexValue::from_field(self.index_type, document.get(&self.field)?)?;
        Some(SecondaryIndex::new(&self.field, value))
    }
}

impl fmt::Display for AutoIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.index_type)
    }
}

/// Parses `field:type`.
impl FromStr for AutoIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (field, index_type) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidDescriptor(format!("expected field:type, got {s:?}")))?;
        if field.is_empty() {
            return Err(Error::InvalidDescriptor(format!("empty field name in {s:?}")));
        }
        Ok(Self::new(field, index_type.parse()?))
    }
}

/// A manually maintained index entry, independent of the stored fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecondaryIndex {
    /// Index name without the type suffix, lowercased.
    pub name: String,
    pub value: IndexValue,
}

impl SecondaryIndex {
    pub fn new(name: impl AsRef<str>, value: impl Into<IndexValue>) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            value: value.into(),
        }
    }

    pub fn int(name: impl AsRef<str>, value: i64) -> Self {
        Self::new(name, IndexValue::Int(value))
    }

    pub fn bin(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        Self::new(name, IndexValue::Bin(value.into()))
    }

    /// Builds an entry from the `(name, type, value)` triple.
    pub fn parse(name: impl AsRef<str>, index_type: IndexType, raw: &str) -> Result<Self> {
        Ok(Self::new(name, IndexValue::parse(index_type, raw)?))
    }

    #[must_use]
    pub fn index_type(&self) -> IndexType {
        self.value.index_type()
    }

    /// Full index name, e.g. `email_bin`.
    #[must_use]
    pub fn index_name(&self) -> String {
        self.index_type().index_name(&self.name)
    }
}

impl fmt::Display for SecondaryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.index_type(), self.value)
    }
}

/// Parses `name:type:value`. The value may itself contain `:`.
impl FromStr for SecondaryIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(index_type), Some(value)) if !name.is_empty() => {
                Self::parse(name, index_type.parse()?, value)
            }
            _ => Err(Error::InvalidDescriptor(format!(
                "expected name:type:value, got {s:?}"
            ))),
        }
    }
}

/// Selects which secondary index entries to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexRemoval {
    /// Every entry.
    All,
    /// Every entry under this name, whatever its type.
    Name(String),
    /// Every entry under this name and type.
    NameAndType(String, IndexType),
    /// Exactly this entry.
    Exact(SecondaryIndex),
}

impl IndexRemoval {
    #[must_use]
    pub fn matches(&self, index: &SecondaryIndex) -> bool {
        match self {
            IndexRemoval::All => true,
            IndexRemoval::Name(name) => index.name == name.to_lowercase(),
            IndexRemoval::NameAndType(name, index_type) => {
                index.name == name.to_lowercase() && index.index_type() == *index_type
            }
            IndexRemoval::Exact(exact) => exact == index,
        }
    }
}

/// Selects which auto index declarations to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoIndexRemoval {
    All,
    /// Both the `int` and `bin` declarations for a field. Field names are
    /// case-sensitive, like document fields.
    Field(String),
    Exact(AutoIndex),
}

impl AutoIndexRemoval {
    #[must_use]
    pub fn matches(&self, index: &AutoIndex) -> bool {
        match self {
            AutoIndexRemoval::All => true,
            AutoIndexRemoval::Field(field) => index.field == *field,
            AutoIndexRemoval::Exact(exact) => exact == index,
        }
    }
}
