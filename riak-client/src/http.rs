//! Riak HTTP store implementation.
//!
//! Talks to a single node through Riak's HTTP interface.

use crate::codec;
use crate::config::RiakConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::{IndexQuery, RiakStore};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, IF_MATCH, LOCATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use riak_types::RiakObject;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Key listing and index query responses.
#[derive(Debug, Deserialize)]
struct KeyList {
    keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchDocs,
}

#[derive(Debug, Deserialize)]
struct SearchDocs {
    docs: Vec<serde_json::Value>,
}

/// Key assigned by the node, from the `Location` header of a create.
fn location_key(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(codec::key_from_location)
}

/// A store backed by one Riak node.
pub struct HttpStore {
    config: RiakConfig,
    base_url: String,
    client: Client,
}

impl HttpStore {
    /// Creates a store for the configured node. No request is sent until the
    /// first operation.
    pub fn new(config: RiakConfig) -> StoreResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url(),
            config,
            client,
        })
    }

    pub fn config(&self) -> &RiakConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> StoreResult<Response> {
        request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{operation} failed: {e}")))
    }

    async fn api_error(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        StoreError::Api { status, body }
    }

    async fn read_keys(response: Response, operation: &str) -> StoreResult<Vec<String>> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(format!("{operation} body read failed: {e}")))?;
        let list: KeyList = serde_json::from_slice(&body)?;
        Ok(list.keys)
    }
}

#[async_trait]
impl RiakStore for HttpStore {
    fn node(&self) -> &str {
        &self.base_url
    }

    async fn ping(&self) -> StoreResult<()> {
        let response = self.send(self.client.get(self.url("/ping")), "ping").await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn fetch(&self, bucket: &str, key: &str) -> StoreResult<Option<RiakObject>> {
        debug!("Fetching {}/{}", bucket, key);

        let request = self.client.get(self.url(&codec::object_path(bucket, key)));
        let response = self.send(request, "fetch").await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::MULTIPLE_CHOICES => {
                return Err(StoreError::Siblings {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }
            _ => return Err(Self::api_error(response).await),
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(format!("fetch body read failed: {e}")))?;

        codec::decode_object(bucket, key, &headers, &body).map(Some)
    }

    async fn store(&self, object: &RiakObject) -> StoreResult<RiakObject> {
        let body = serde_json::to_vec(&object.data)?;

        let request = match object.key() {
            Some(key) => {
                debug!("Storing {}/{} ({} bytes)", object.bucket, key, body.len());
                self.client.put(self.url(&codec::object_path(&object.bucket, key)))
            }
            None => {
                debug!("Creating object in {} ({} bytes)", object.bucket, body.len());
                self.client.post(self.url(&codec::keys_path(&object.bucket)))
            }
        };

        let mut request = request
            .query(&[("returnbody", "true")])
            .headers(codec::encode_headers(object)?)
            .body(body);

        if self.config.conditional_writes {
            if let Some(etag) = &object.etag {
                let value = HeaderValue::from_str(etag)
                    .map_err(|_| StoreError::InvalidData(format!("invalid etag: {etag:?}")))?;
                request = request.header(IF_MATCH, value);
            }
        }

        let response = self.send(request, "store").await?;
        let key_label = object.key().unwrap_or("<new>").to_string();

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {}
            StatusCode::MULTIPLE_CHOICES => {
                let key = object.key.clone().or_else(|| location_key(&response));
                warn!("Write to {}/{} left siblings", object.bucket, key_label);
                return Err(StoreError::WriteSiblings {
                    bucket: object.bucket.clone(),
                    key,
                });
            }
            StatusCode::PRECONDITION_FAILED => {
                return Err(StoreError::Conflict {
                    bucket: object.bucket.clone(),
                    key: key_label,
                });
            }
            _ => return Err(Self::api_error(response).await),
        }

        let key = match object.key() {
            Some(key) => key.to_string(),
            None => location_key(&response).ok_or_else(|| {
                StoreError::InvalidData("create response carried no Location header".to_string())
            })?,
        };

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(format!("store body read failed: {e}")))?;

        info!("Stored {}/{}", object.bucket, key);

        if body.is_empty() {
            let mut stored = object.clone();
            stored.key = Some(key);
            return Ok(stored);
        }

        codec::decode_object(&object.bucket, &key, &headers, &body)
    }

    async fn delete(&self, bucket: &str, key: &str, vclock: Option<&str>) -> StoreResult<bool> {
        debug!("Deleting {}/{}", bucket, key);

        let mut request = self.client.delete(self.url(&codec::object_path(bucket, key)));
        if let Some(vclock) = vclock {
            let value = HeaderValue::from_str(vclock)
                .map_err(|_| StoreError::InvalidData(format!("invalid vclock: {vclock:?}")))?;
            request = request.header(HeaderName::from_static(codec::VCLOCK_HEADER), value);
        }

        let response = self.send(request, "delete").await?;
        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => {
                info!("Deleted {}/{}", bucket, key);
                Ok(true)
            }
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::api_error(response).await),
        }
    }

    async fn list_keys(&self, bucket: &str) -> StoreResult<Vec<String>> {
        debug!("Listing keys in {}", bucket);

        let request = self
            .client
            .get(self.url(&codec::keys_path(bucket)))
            .query(&[("keys", "true")]);
        let response = self.send(request, "list keys").await?;
        Self::read_keys(response, "list keys").await
    }

    async fn index_query(&self, bucket: &str, query: &IndexQuery) -> StoreResult<Vec<String>> {
        debug!("Index query on {}: {:?}", bucket, query);

        let request = self.client.get(self.url(&codec::index_path(bucket, query)));
        let response = self.send(request, "index query").await?;
        Self::read_keys(response, "index query").await
    }

    async fn search(&self, index: &str, query: &str) -> StoreResult<Vec<serde_json::Value>> {
        debug!("Search on {}: {}", index, query);

        let request = self
            .client
            .get(self.url(&codec::search_path(index)))
            .query(&[("wt", "json"), ("q", query)]);
        let response = self.send(request, "search").await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(format!("search body read failed: {e}")))?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        Ok(parsed.response.docs)
    }
}
