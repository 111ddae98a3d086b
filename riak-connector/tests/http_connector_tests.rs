use pretty_assertions::assert_eq;
use riak_connector::{Connector, ConnectorError, InsertOptions, RiakConfig};
use riak_types::{AutoIndex, Document};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn connector_for(server: &MockServer, conditional_writes: bool) -> Connector {
    let addr = server.address();
    let mut config = RiakConfig::new(addr.ip().to_string(), addr.port());
    config.conditional_writes = conditional_writes;
    Connector::with_config(config).unwrap()
}

fn stored_john(age: i64, vclock: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json")
        .insert_header("x-riak-vclock", vclock)
        .insert_header("etag", "\"e1\"")
        .set_body_json(json!({"name": "John", "age": age}))
}

#[tokio::test]
async fn update_echoes_fetched_vclock() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/buckets/people/keys/john"))
        .respond_with(stored_john(28, "a85hYGBgzGDKBVIc"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/buckets/people/keys/john"))
        .and(header("x-riak-vclock", "a85hYGBgzGDKBVIc"))
        .respond_with(stored_john(29, "a85hYGBgzGDKBVId"))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector_for(&server, false);
    let updates = Document::from_value(json!({"age": 29})).unwrap();
    let changed = connector.update("people", "john", &updates).await.unwrap();
    assert_eq!(changed, 1);

    let requests = server.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert_eq!(body, json!({"name": "John", "age": 29}));
    assert!(put.headers.get("if-match").is_none());
}

#[tokio::test]
async fn conditional_update_reports_conflict() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/buckets/people/keys/john"))
        .respond_with(stored_john(28, "v1"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/buckets/people/keys/john"))
        .and(header("if-match", "\"e1\""))
        .respond_with(ResponseTemplate::new(412))
        .mount(&server)
        .await;

    let connector = connector_for(&server, true);
    let err = connector
        .add_fields("people", "john", Document::from_value(json!({"city": "Paris"})).unwrap())
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn update_that_leaves_siblings_is_reported_as_stored() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/buckets/people/keys/john"))
        .respond_with(stored_john(28, "v1"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/buckets/people/keys/john"))
        .respond_with(ResponseTemplate::new(300))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector_for(&server, false);
    let err = connector
        .update("people", "john", &Document::from_value(json!({"age": 29})).unwrap())
        .await
        .unwrap_err();
    assert!(err.write_was_stored());
    assert!(!err.is_conflict());
}

#[tokio::test]
async fn insert_without_id_uses_location_key() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/buckets/people/keys"))
        .and(header("x-riak-index-age_int", "28"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("location", "/buckets/people/keys/Ab3xK9")
                .insert_header("content-type", "application/json")
                .set_body_json(json!({"name": "John", "age": 28})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector_for(&server, false);
    let key = connector
        .insert(
            "people",
            Document::from_value(json!({"name": "John", "age": 28})).unwrap(),
            InsertOptions::new().with_auto_index(AutoIndex::int("age")),
        )
        .await
        .unwrap();
    assert_eq!(key, "Ab3xK9");
}

#[tokio::test]
async fn update_of_missing_key_does_not_write() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/buckets/people/keys/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let connector = connector_for(&server, false);
    let err = connector
        .update("people", "ghost", &Document::from_value(json!({"a": 1})).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::NotFound { .. }));
}

#[tokio::test]
async fn unreachable_node_is_unavailable() {
    init_tracing();
    let connector = Connector::connect("127.0.0.1", 1).unwrap();

    let err = connector.find_one("people", "john").await.unwrap_err();
    assert!(err.is_unavailable());
    assert!(err.to_string().starts_with("riak server not available"));
}
