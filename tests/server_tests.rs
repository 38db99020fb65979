//! Search endpoint status codes and relayed JSON, against an in-memory store.

mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::MemoryStore;
use mailfeed::engine::{SharedStore, create_router};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn get(store: MemoryStore, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let store: SharedStore = Arc::new(store);
    let response = create_router(store)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let cors = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, cors, body.to_vec())
}

#[tokio::test]
async fn test_search_relays_index_json() {
    let (status, cors, body) = get(MemoryStore::new(), "/search?q=energy%20trading").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cors.as_deref(), Some("*"));
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["term"], "energy trading");
    assert_eq!(json["hits"]["total"]["value"], 0);
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
        let (status, cors, _) = get(MemoryStore::new(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(cors.as_deref(), Some("*"));
    }
}

#[tokio::test]
async fn test_index_failure_is_server_error() {
    let (status, _, body) = get(MemoryStore::failing_search(), "/search?q=enron").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _, _) = get(MemoryStore::new(), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
