//! Argument parsing and command execution for `riakctl`.
//!
//! Kept out of `main.rs` so commands can be run against any
//! [`Connector`], including one backed by a [`riak_client::MemoryStore`].

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use riak_client::RiakConfig;
use riak_connector::{Connector, InsertOptions};
use riak_types::{
    AutoIndex, AutoIndexRemoval, Document, IndexRemoval, IndexType, IndexValue, Link, LinkRemoval,
    SecondaryIndex,
};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "riakctl")]
#[command(about = "Store, query and link JSON documents in a Riak node")]
pub struct Args {
    /// Riak host (overrides the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Riak HTTP port (overrides the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// JSON file with connection settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Check that the node answers
    Ping,

    /// Fetch one document
    Get {
        bucket: String,
        key: String,
        /// Print links, indexes and causal context as well
        #[arg(long)]
        object: bool,
    },

    /// Fetch every document in a bucket
    List { bucket: String },

    /// Insert a JSON document and print its key
    Put {
        bucket: String,
        data: String,
        #[arg(short, long)]
        key: Option<String>,
        /// Secondary index as name:type:value
        #[arg(long = "index")]
        indexes: Vec<SecondaryIndex>,
        /// Auto index as field:type
        #[arg(long = "auto-index")]
        auto_indexes: Vec<AutoIndex>,
        /// Link as tag:bucket:key
        #[arg(long = "link")]
        links: Vec<Link>,
    },

    /// Overwrite fields the stored document already has
    Update { bucket: String, key: String, data: String },

    /// Merge fields into the stored document
    AddFields { bucket: String, key: String, data: String },

    /// Remove fields from the stored document
    RemoveFields {
        bucket: String,
        key: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Delete a document
    Delete { bucket: String, key: String },

    /// Find documents with an exact index term
    Index {
        bucket: String,
        name: String,
        value: String,
        #[arg(short = 't', long = "type", default_value = "bin")]
        index_type: IndexType,
    },

    /// Find documents with an index term in start..=end
    Range {
        bucket: String,
        name: String,
        start: String,
        end: String,
        #[arg(short = 't', long = "type", default_value = "int")]
        index_type: IndexType,
        /// Return a document once per matching term
        #[arg(long)]
        duplicates: bool,
    },

    /// Add links (tag:bucket:key) to a stored document
    Link {
        bucket: String,
        key: String,
        #[arg(required = true)]
        links: Vec<Link>,
    },

    /// Remove links; with no filter every link is removed
    Unlink {
        bucket: String,
        key: String,
        #[arg(long, conflicts_with = "link")]
        tag: Option<String>,
        #[arg(long)]
        link: Option<Link>,
    },

    /// Print the documents a stored document links to
    Linked {
        bucket: String,
        key: String,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long = "target-bucket")]
        target_bucket: Option<String>,
    },

    /// Add secondary indexes (name:type:value) to a stored document
    AddIndex {
        bucket: String,
        key: String,
        #[arg(required = true)]
        indexes: Vec<SecondaryIndex>,
    },

    /// Remove secondary indexes by name; with no name every index is removed
    RemoveIndex {
        bucket: String,
        key: String,
        name: Option<String>,
    },

    /// Add auto indexes (field:type) to a stored document
    AddAutoIndex {
        bucket: String,
        key: String,
        #[arg(required = true)]
        indexes: Vec<AutoIndex>,
    },

    /// Remove auto indexes by field; with no field every auto index is removed
    RemoveAutoIndex {
        bucket: String,
        key: String,
        field: Option<String>,
    },

    /// Run a full-text query against a search index
    Search { index: String, query: String },
}

/// Builds the connection settings: the config file if given, then the
/// command-line overrides.
pub async fn load_config(
    path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<RiakConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => RiakConfig::default(),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.validate()?;
    debug!("Using Riak node at {}", config.base_url());
    Ok(config)
}

fn parse_document(data: &str) -> Result<Document> {
    Document::from_json(data).context("data must be a JSON object")
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Runs one command and returns what should be printed.
pub async fn run(connector: &Connector, command: Command) -> Result<String> {
    match command {
        Command::Ping => {
            connector.ping().await?;
            Ok(format!("{} is up", connector.node()))
        }
        Command::Get {
            bucket,
            key,
            object,
        } => {
            let found = if object {
                connector
                    .find_one_object(&bucket, &key)
                    .await?
                    .map(|o| pretty(&o))
                    .transpose()?
            } else {
                connector
                    .find_one(&bucket, &key)
                    .await?
                    .map(|d| pretty(&d))
                    .transpose()?
            };
            match found {
                Some(text) => Ok(text),
                None => bail!("{bucket}/{key} not found"),
            }
        }
        Command::List { bucket } => pretty(&connector.find_all(&bucket).await?),
        Command::Put {
            bucket,
            data,
            key,
            indexes,
            auto_indexes,
            links,
        } => {
            let options = InsertOptions {
                id: key,
                auto_indexes,
                indexes,
                links,
            };
            Ok(connector.insert(&bucket, parse_document(&data)?, options).await?)
        }
        Command::Update { bucket, key, data } => {
            let changed = connector.update(&bucket, &key, &parse_document(&data)?).await?;
            Ok(format!("updated {changed} field(s)"))
        }
        Command::AddFields { bucket, key, data } => {
            connector.add_fields(&bucket, &key, parse_document(&data)?).await?;
            Ok("ok".to_string())
        }
        Command::RemoveFields {
            bucket,
            key,
            fields,
        } => {
            let removed = connector.remove_fields(&bucket, &key, &fields).await?;
            Ok(format!("removed {removed} field(s)"))
        }
        Command::Delete { bucket, key } => {
            if connector.remove(&bucket, &key).await? {
                Ok(format!("deleted {bucket}/{key}"))
            } else {
                Ok(format!("{bucket}/{key} did not exist"))
            }
        }
        Command::Index {
            bucket,
            name,
            value,
            index_type,
        } => {
            let value = IndexValue::parse(index_type, &value)?;
            pretty(&connector.find_by_index(&bucket, &name, value).await?)
        }
        Command::Range {
            bucket,
            name,
            start,
            end,
            index_type,
            duplicates,
        } => {
            let start = IndexValue::parse(index_type, &start)?;
            let end = IndexValue::parse(index_type, &end)?;
            pretty(
                &connector
                    .find_by_index_range(&bucket, &name, start, end, duplicates)
                    .await?,
            )
        }
        Command::Link { bucket, key, links } => {
            connector.add_links(&bucket, &key, links).await?;
            Ok("ok".to_string())
        }
        Command::Unlink {
            bucket,
            key,
            tag,
            link,
        } => {
            let removal = match (tag, link) {
                (_, Some(link)) => LinkRemoval::Exact(link),
                (Some(tag), None) => LinkRemoval::Tag(tag),
                (None, None) => LinkRemoval::All,
            };
            let removed = connector.remove_links(&bucket, &key, &[removal]).await?;
            Ok(format!("removed {removed} link(s)"))
        }
        Command::Linked {
            bucket,
            key,
            tag,
            target_bucket,
        } => {
            let Some(object) = connector.find_one_object(&bucket, &key).await? else {
                bail!("{bucket}/{key} not found");
            };
            let linked = connector
                .linked_objects(&object, tag.as_deref(), target_bucket.as_deref())
                .await?;
            pretty(&linked)
        }
        Command::AddIndex {
            bucket,
            key,
            indexes,
        } => {
            connector.add_indexes(&bucket, &key, &indexes).await?;
            Ok("ok".to_string())
        }
        Command::RemoveIndex { bucket, key, name } => {
            let removal = name.map_or(IndexRemoval::All, IndexRemoval::Name);
            let removed = connector.remove_indexes(&bucket, &key, &[removal]).await?;
            Ok(format!("removed {removed} index(es)"))
        }
        Command::AddAutoIndex {
            bucket,
            key,
            indexes,
        } => {
            connector.add_auto_indexes(&bucket, &key, &indexes).await?;
            Ok("ok".to_string())
        }
        Command::RemoveAutoIndex { bucket, key, field } => {
            let removal = field.map_or(AutoIndexRemoval::All, AutoIndexRemoval::Field);
            let removed = connector.remove_auto_indexes(&bucket, &key, &[removal]).await?;
            Ok(format!("removed {removed} auto index(es)"))
        }
        Command::Search { index, query } => pretty(&connector.search(&index, &query).await?),
    }
}
