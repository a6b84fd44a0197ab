//! Managed database client tests
//!
//! Exercises the hosted-table REST protocol against a mock HTTP
//! server: query shape, defensive row decoding, error surfacing, and
//! read-after-write.

use serde_json::json;
use tally_core::sync::DatabaseClient;
use tally_core::{Entry, EntryDraft, EntryKind, SyncError, DEFAULT_CATEGORY};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "anon-key";

fn client_for(server: &MockServer) -> DatabaseClient {
    DatabaseClient::new(
        reqwest::Client::new(),
        Some(server.uri()),
        Some(KEY.to_string()),
    )
}

fn sample_entry() -> Entry {
    Entry::from_draft(&EntryDraft::new("Lunch", 120.0, EntryKind::Expense, "飲食"))
}

#[tokio::test]
async fn fetch_queries_table_newest_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/entries"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "b",
                "description": "Salary",
                "amount": 50000,
                "type": "income",
                "category": "薪水",
                "date": "2026-08-02",
                "created_at": "2026-08-02T09:00:00Z"
            },
            {
                "id": "a",
                "description": "Lunch",
                "amount": 120,
                "type": "expense",
                "category": "飲食",
                "date": "2026-08-01",
                "created_at": "2026-08-01T12:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client_for(&server).fetch_all().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "b");
    assert_eq!(entries[1].id, "a");
}

#[tokio::test]
async fn fetch_decodes_partial_rows_with_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "x", "amount": "12.5", "type": "transfer", "category": null},
            {"id": "y"}
        ])))
        .mount(&server)
        .await;

    let entries = client_for(&server).fetch_all().await.unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].amount, 12.5);
    assert_eq!(entries[0].kind, EntryKind::Expense);
    assert_eq!(entries[0].category, DEFAULT_CATEGORY);

    assert_eq!(entries[1].description, "");
    assert_eq!(entries[1].amount, 0.0);
    assert_eq!(entries[1].date, "");
}

#[tokio::test]
async fn fetch_error_prefers_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "JWT expired"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_all().await.unwrap_err();
    match err {
        SyncError::Remote(message) => assert_eq!(message, "JWT expired"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn fetch_error_without_message_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_all().await.unwrap_err();
    match err {
        SyncError::Remote(message) => assert_eq!(message, "HTTP 500"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn add_inserts_then_rereads() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/entries"))
        .and(header("apikey", KEY))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "fresh", "description": "Lunch", "amount": 120, "type": "expense",
             "category": "飲食", "date": "2026-08-05"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client_for(&server).add(&sample_entry()).await.unwrap();
    // The result is a fresh read, not the inserted row echoed back
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "fresh");
}

#[tokio::test]
async fn add_error_skips_reread() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "duplicate key"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).add(&sample_entry()).await.unwrap_err();
    match err {
        SyncError::Remote(message) => assert_eq!(message, "duplicate key"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn delete_filters_by_id_then_rereads() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/entries"))
        .and(query_param("id", "eq.abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client_for(&server).delete("abc").await.unwrap();
    assert!(entries.is_empty());
}
