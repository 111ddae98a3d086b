use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderValue};
use riak_client::codec::{
    decode_auto_indexes, decode_index_header, decode_links, decode_object, encode_auto_indexes,
    encode_headers, encode_link, index_path, key_from_location, object_path,
};
use riak_client::{IndexQuery, StoreError};
use riak_types::{AutoIndex, Document, Link, RiakObject, SecondaryIndex};
use serde_json::json;
use std::collections::BTreeSet;

// ── Paths ─────────────────────────────────────────────────────────

#[test]
fn object_path_encodes_segments() {
    assert_eq!(object_path("people", "john"), "/buckets/people/keys/john");
    assert_eq!(object_path("my bucket", "a/b"), "/buckets/my%20bucket/keys/a%2Fb");
}

#[test]
fn index_paths() {
    assert_eq!(
        index_path("people", &IndexQuery::exact("email", "a@b.c")),
        "/buckets/people/index/email_bin/a%40b.c"
    );
    assert_eq!(
        index_path("people", &IndexQuery::range("age", 20, 30).unwrap()),
        "/buckets/people/index/age_int/20/30"
    );
}

#[test]
fn range_query_rejects_mixed_types() {
    assert!(IndexQuery::range("age", 20, "thirty").is_err());
}

// ── Links ─────────────────────────────────────────────────────────

#[test]
fn encode_link_format() {
    let link = Link::new("best friend", "people", "jane");
    assert_eq!(
        encode_link(&link),
        "</buckets/people/keys/jane>; riaktag=\"best%20friend\""
    );
}

#[test]
fn decode_links_round_trips_encoded_links() {
    let links = vec![
        Link::new("best friend", "people", "jane doe"),
        Link::new("employer", "companies", "acme"),
    ];
    let header: Vec<String> = links.iter().map(encode_link).collect();
    assert_eq!(decode_links(&header.join(", ")), links);
}

#[test]
fn decode_links_skips_up_link_and_accepts_legacy_form() {
    let header = "</buckets/people>; rel=\"up\", </riak/people/bob>; riaktag=\"friend\"";
    assert_eq!(decode_links(header), vec![Link::new("friend", "people", "bob")]);
}

#[test]
fn decode_links_ignores_garbage() {
    assert!(decode_links("nonsense, <also>; nonsense").is_empty());
}

#[test]
fn key_from_location_takes_last_segment() {
    assert_eq!(
        key_from_location("/buckets/people/keys/Ab3kX9"),
        Some("Ab3kX9".to_string())
    );
    assert_eq!(
        key_from_location("http://riak:8098/buckets/people/keys/a%20b"),
        Some("a b".to_string())
    );
    assert_eq!(key_from_location("nokey"), None);
}

// ── Indexes ───────────────────────────────────────────────────────

#[test]
fn decode_index_header_splits_values() {
    let indexes = decode_index_header("team_bin", "red, blue").unwrap();
    assert_eq!(
        indexes,
        vec![SecondaryIndex::bin("team", "red"), SecondaryIndex::bin("team", "blue")]
    );
}

#[test]
fn decode_index_header_rejects_bad_ints() {
    let err = decode_index_header("age_int", "twelve").unwrap_err();
    assert!(matches!(err, StoreError::Model(_)));
}

#[test]
fn auto_index_meta_round_trip() {
    let set: BTreeSet<_> = [AutoIndex::int("Age"), AutoIndex::bin("first_name")]
        .into_iter()
        .collect();
    let encoded = encode_auto_indexes(&set).unwrap().unwrap();
    assert_eq!(encoded, r#"{"Age_int":"Age","first_name_bin":"first_name"}"#);
    assert_eq!(decode_auto_indexes(&encoded).unwrap(), set);
}

#[test]
fn auto_index_meta_keeps_fields_that_differ_in_case() {
    let set: BTreeSet<_> = [AutoIndex::int("Age"), AutoIndex::int("age")]
        .into_iter()
        .collect();
    let encoded = encode_auto_indexes(&set).unwrap().unwrap();
    assert_eq!(decode_auto_indexes(&encoded).unwrap(), set);
}

#[test]
fn empty_auto_index_set_sends_no_header() {
    assert_eq!(encode_auto_indexes(&BTreeSet::new()).unwrap(), None);
}

// ── Whole objects ─────────────────────────────────────────────────

#[test]
fn encode_headers_groups_index_values() {
    let mut object = RiakObject::new("people", Some("john".to_string()), Document::new());
    object.add_index(SecondaryIndex::int("score", 3));
    object.add_index(SecondaryIndex::int("score", 10));

    let headers = encode_headers(&object).unwrap();
    assert_eq!(headers.get("x-riak-index-score_int").unwrap(), "3, 10");
    assert!(headers.get("x-riak-vclock").is_none());
    assert!(headers.get("link").is_none());
}

#[test]
fn encode_headers_rejects_unsendable_values() {
    let mut object = RiakObject::new("people", Some("john".to_string()), Document::new());
    object.add_index(SecondaryIndex::bin("note", "line\nbreak"));
    assert!(matches!(
        encode_headers(&object).unwrap_err(),
        StoreError::InvalidData(_)
    ));
}

#[test]
fn decode_object_round_trips_encoded_headers() {
    let data = Document::from_value(json!({"name": "John", "age": 28})).unwrap();
    let mut object = RiakObject::new("people", Some("john".to_string()), data);
    object.vclock = Some("clock".to_string());
    object.add_link(Link::new("friend", "people", "jane"));
    object.add_index(SecondaryIndex::bin("team", "red"));
    object.add_auto_index(AutoIndex::int("age"));

    let headers = encode_headers(&object).unwrap();
    let body = serde_json::to_vec(&object.data).unwrap();
    let decoded = decode_object("people", "john", &headers, &body).unwrap();

    assert_eq!(decoded, object);
}

#[test]
fn decode_object_round_trips_non_ascii_index_values() {
    let data = Document::from_value(json!({"name": "José"})).unwrap();
    let mut object = RiakObject::new("people", Some("jose".to_string()), data);
    object.add_auto_index(AutoIndex::bin("name"));
    object.add_index(SecondaryIndex::bin("city", "Bogotá"));

    let headers = encode_headers(&object).unwrap();
    let body = serde_json::to_vec(&object.data).unwrap();
    let decoded = decode_object("people", "jose", &headers, &body).unwrap();

    assert_eq!(decoded, object);
    assert_eq!(
        decoded.effective_indexes().into_iter().collect::<Vec<_>>(),
        vec![SecondaryIndex::bin("city", "Bogotá"), SecondaryIndex::bin("name", "José")]
    );
}

#[test]
fn decode_object_rejects_non_utf8_index_value() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-riak-index-city_bin",
        HeaderValue::from_bytes(b"Bogot\xe1").unwrap(),
    );
    let err = decode_object("people", "jose", &headers, b"{}").unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn decode_object_with_empty_body() {
    let decoded = decode_object("people", "john", &HeaderMap::new(), b"").unwrap();
    assert!(decoded.data.is_empty());
    assert!(decoded.vclock.is_none());
}

#[test]
fn decode_object_rejects_non_object_json() {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    let err = decode_object("people", "john", &headers, b"[1,2]").unwrap_err();
    assert!(matches!(err, StoreError::Model(_)));
}
