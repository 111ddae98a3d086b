use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Connection settings for a single Riak node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiakConfig {
    pub host: String,
    /// HTTP port (Riak's default is 8098).
    pub port: u16,
    /// `http` or `https`.
    pub scheme: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Send `If-Match` with the fetched etag on writes, so a concurrent
    /// modification surfaces as [`StoreError::Conflict`].
    pub conditional_writes: bool,
}

impl Default for RiakConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8098,
            scheme: "http".to_string(),
            timeout_secs: 30,
            conditional_writes: false,
        }
    }
}

impl RiakConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Base URL of the node, e.g. `http://127.0.0.1:8098`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.host.trim().is_empty() {
            return Err(StoreError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(StoreError::Config("port must not be 0".to_string()));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(StoreError::Config(format!(
                "unsupported scheme {:?} (expected http or https)",
                self.scheme
            )));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
