//! HTTP wire mapping for Riak objects.
//!
//! Riak keeps everything except the value in headers:
//! - `X-Riak-Vclock`: opaque causal context, echoed back on write
//! - `Link: </buckets/{b}/keys/{k}>; riaktag="{tag}"`, comma separated
//! - `x-riak-index-{name}_{int|bin}: v1, v2`
//! - `x-riak-meta-autoindex`: JSON object mapping index name to the
//!   document field an auto index reads from
//!
//! Path components and link tags are percent-encoded.

use crate::error::{StoreError, StoreResult};
use crate::store::IndexQuery;
use reqwest::header::{CONTENT_TYPE, ETAG, HeaderMap, HeaderName, HeaderValue, LINK};
use riak_types::{AutoIndex, Document, IndexType, Link, RiakObject, SecondaryIndex};
use std::collections::{BTreeMap, BTreeSet};

pub const VCLOCK_HEADER: &str = "x-riak-vclock";
pub const INDEX_HEADER_PREFIX: &str = "x-riak-index-";
pub const AUTO_INDEX_HEADER: &str = "x-riak-meta-autoindex";

/// Percent-encodes one path segment.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn decode_segment(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

pub fn keys_path(bucket: &str) -> String {
    format!("/buckets/{}/keys", encode_segment(bucket))
}

pub fn object_path(bucket: &str, key: &str) -> String {
    format!("/buckets/{}/keys/{}", encode_segment(bucket), encode_segment(key))
}

pub fn index_path(bucket: &str, query: &IndexQuery) -> String {
    let base = format!(
        "/buckets/{}/index/{}",
        encode_segment(bucket),
        encode_segment(&query.index_name())
    );
    match query {
        IndexQuery::Exact { value, .. } => {
            format!("{base}/{}", encode_segment(&value.to_string()))
        }
        IndexQuery::Range { start, end, .. } => format!(
            "{base}/{}/{}",
            encode_segment(&start.to_string()),
            encode_segment(&end.to_string())
        ),
    }
}

pub fn search_path(index: &str) -> String {
    format!("/search/query/{}", encode_segment(index))
}

pub fn encode_link(link: &Link) -> String {
    format!(
        "<{}>; riaktag=\"{}\"",
        object_path(&link.bucket, &link.key),
        encode_segment(&link.tag)
    )
}

/// Parses a `Link` header value. Entries without a `riaktag` (such as the
/// `rel="up"` link to the bucket) are skipped.
pub fn decode_links(value: &str) -> Vec<Link> {
    value.split(',').filter_map(decode_link).collect()
}

fn decode_link(entry: &str) -> Option<Link> {
    let (target, params) = entry.trim().strip_prefix('<')?.split_once('>')?;
    let tag = params
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("riaktag="))?
        .trim_matches('"');

    let segments: Vec<&str> = target.trim_start_matches('/').split('/').collect();
    let (bucket, key) = match segments.as_slice() {
        ["buckets", bucket, "keys", key] => (*bucket, *key),
        ["riak", bucket, key] => (*bucket, *key),
        _ => return None,
    };

    Some(Link::new(
        decode_segment(tag)?,
        decode_segment(bucket)?,
        decode_segment(key)?,
    ))
}

/// Extracts the key from the `Location` header of a create response.
pub fn key_from_location(location: &str) -> Option<String> {
    let (_, key) = location.trim_end_matches('/').rsplit_once('/')?;
    decode_segment(key).filter(|key| !key.is_empty())
}

/// Parses one `x-riak-index-*` header. `index_name` is the part after the
/// prefix, e.g. `age_int`.
pub fn decode_index_header(index_name: &str, value: &str) -> StoreResult<Vec<SecondaryIndex>> {
    let (name, index_type) = IndexType::split_index_name(index_name)?;
    value
        .split(',')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| Ok(SecondaryIndex::parse(&name, index_type, raw)?))
        .collect()
}

pub fn encode_auto_indexes(auto_indexes: &BTreeSet<AutoIndex>) -> StoreResult<Option<String>> {
    if auto_indexes.is_empty() {
        return Ok(None);
    }
    // Keys keep the field's case; `Age` and `age` are different fields.
    let map: BTreeMap<String, &str> = auto_indexes
        .iter()
        .map(|auto| {
            let key = format!("{}_{}", auto.field, auto.index_type.suffix());
            (key, auto.field.as_str())
        })
        .collect();
    Ok(Some(serde_json::to_string(&map)?))
}

pub fn decode_auto_indexes(value: &str) -> StoreResult<BTreeSet<AutoIndex>> {
    let map: BTreeMap<String, String> = serde_json::from_str(value)?;
    map.into_iter()
        .map(|(index_name, field)| {
            let (_, index_type) = IndexType::split_index_name(&index_name)?;
            Ok(AutoIndex::new(field, index_type))
        })
        .collect()
}

fn header_value(value: &str) -> StoreResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        StoreError::InvalidData(format!("value cannot be sent as a header: {value:?}"))
    })
}

/// Header text as UTF-8. `HeaderValue::to_str` only accepts visible ASCII,
/// but index terms and field names are sent as raw UTF-8.
fn header_text(value: &HeaderValue) -> Option<&str> {
    std::str::from_utf8(value.as_bytes()).ok()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(header_text)
}

/// Builds the metadata headers for a write.
pub fn encode_headers(object: &RiakObject) -> StoreResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(vclock) = &object.vclock {
        headers.insert(HeaderName::from_static(VCLOCK_HEADER), header_value(vclock)?);
    }

    if !object.links.is_empty() {
        let links: Vec<String> = object.links.iter().map(encode_link).collect();
        headers.insert(LINK, header_value(&links.join(", "))?);
    }

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for index in object.effective_indexes() {
        grouped
            .entry(index.index_name())
            .or_default()
            .push(index.value.to_string());
    }
    for (index_name, values) in grouped {
        let name = HeaderName::from_bytes(format!("{INDEX_HEADER_PREFIX}{index_name}").as_bytes())
            .map_err(|_| StoreError::InvalidData(format!("invalid index name: {index_name:?}")))?;
        headers.insert(name, header_value(&values.join(", "))?);
    }

    if let Some(meta) = encode_auto_indexes(&object.auto_indexes)? {
        headers.insert(HeaderName::from_static(AUTO_INDEX_HEADER), header_value(&meta)?);
    }

    Ok(headers)
}

/// Decodes a fetch (or `returnbody`) response into an object.
pub fn decode_object(
    bucket: &str,
    key: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> StoreResult<RiakObject> {
    if let Some(content_type) = header_str(headers, CONTENT_TYPE.as_str()) {
        if !content_type.contains("json") {
            return Err(StoreError::InvalidData(format!(
                "{bucket}/{key} has unsupported content type {content_type:?}"
            )));
        }
    }

    let data = if body.iter().all(u8::is_ascii_whitespace) {
        Document::new()
    } else {
        Document::from_slice(body)?
    };

    let mut object = RiakObject::new(bucket, Some(key.to_string()), data);
    object.vclock = header_str(headers, VCLOCK_HEADER).map(str::to_string);
    object.etag = header_str(headers, ETAG.as_str()).map(str::to_string);

    for value in headers.get_all(LINK) {
        if let Some(value) = header_text(value) {
            for link in decode_links(value) {
                object.add_link(link);
            }
        }
    }

    for (name, value) in headers {
        if let Some(index_name) = name.as_str().strip_prefix(INDEX_HEADER_PREFIX) {
            let value = header_text(value).ok_or_else(|| {
                StoreError::InvalidData(format!("non-UTF-8 value for index {index_name}"))
            })?;
            object.indexes.extend(decode_index_header(index_name, value)?);
        }
    }

    if let Some(meta) = header_str(headers, AUTO_INDEX_HEADER) {
        object.auto_indexes = decode_auto_indexes(meta)?;
    }
    object.strip_derived_indexes();

    Ok(object)
}
