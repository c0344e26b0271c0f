//! Client tests against an in-process fake backend.
//!
//! Each test binds an axum router to an ephemeral loopback port and points a
//! real `MemoryClient` at it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use memory_api::{
    ClientConfig, Error, Fact, ImportSource, MemoryClient, Upload, QUERY_TOP_K,
};
use serde::Deserialize;
use serde_json::{json, Value};

async fn serve(router: Router) -> MemoryClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    MemoryClient::new(ClientConfig::new(format!("http://{addr}"))).unwrap()
}

fn store(count: usize) -> Vec<Fact> {
    (0..count)
        .map(|i| Fact::new(format!("f{i}"), format!("fact number {i}"), "other"))
        .collect()
}

#[derive(Debug, Deserialize)]
struct Page {
    limit: usize,
    offset: usize,
}

#[derive(Debug, Deserialize)]
struct ImportParams {
    #[serde(rename = "type")]
    kind: String,
}

#[tokio::test]
async fn test_get_stats() {
    let client = serve(Router::new().route(
        "/stats",
        get(|| async {
            Json(json!({
                "total_facts": 42,
                "storage_type": "pinecone",
                "index_name": "memories"
            }))
        }),
    ))
    .await;

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total_facts, 42);
    assert_eq!(stats.storage_type, "pinecone");
    assert_eq!(stats.index_name.as_deref(), Some("memories"));
}

#[tokio::test]
async fn test_get_stats_without_index_name() {
    let client = serve(Router::new().route(
        "/stats",
        get(|| async { Json(json!({"total_facts": 0, "storage_type": "mock"})) }),
    ))
    .await;

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total_facts, 0);
    assert!(stats.index_name.is_none());
}

#[tokio::test]
async fn test_health() {
    let client = serve(Router::new().route(
        "/health",
        get(|| async { Json(json!({"status": "ok"})) }),
    ))
    .await;

    assert!(client.health().await.unwrap().is_ok());
}

#[tokio::test]
async fn test_get_facts_sends_pagination() {
    let client = serve(Router::new().route(
        "/facts",
        get(|Query(page): Query<Page>| async move {
            let facts: Vec<Fact> = store(7)
                .into_iter()
                .skip(page.offset)
                .take(page.limit)
                .collect();
            Json(facts)
        }),
    ))
    .await;

    let facts = client.get_facts(2, 4).await.unwrap();
    let ids: Vec<&str> = facts.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["f4", "f5"]);

    let tail = client.get_facts(50, 6).await.unwrap();
    assert_eq!(tail.len(), 1);
}

#[tokio::test]
async fn test_get_facts_never_exceeds_limit() {
    // A backend that ignores the requested page size.
    let client = serve(Router::new().route("/facts", get(|| async { Json(store(10)) })))
        .await;

    for limit in [1, 3, 10, 25] {
        let facts = client.get_facts(limit, 0).await.unwrap();
        assert!(facts.len() <= limit, "limit {limit} gave {}", facts.len());
    }
    let facts = client.get_facts(3, 0).await.unwrap();
    assert_eq!(facts[0].id, "f0");
    assert_eq!(facts[2].id, "f2");
}

#[tokio::test]
async fn test_query_body_and_response() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let client = serve(Router::new().route(
        "/query",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(body);
                Json(json!({
                    "answer": "X",
                    "retrieved_facts": [
                        {"id": "1", "content": "Y", "category": "goal", "metadata": {}}
                    ]
                }))
            }
        }),
    ))
    .await;

    let response = client.query("What are my goals?").await.unwrap();
    assert_eq!(response.answer, "X");
    assert_eq!(response.retrieved_facts, vec![Fact::new("1", "Y", "goal")]);

    let bodies = seen.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({"query": "What are my goals?", "top_k": QUERY_TOP_K})
    );
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let hits = Arc::new(Mutex::new(0usize));
    let counter = hits.clone();

    let client = serve(Router::new().route(
        "/query",
        post(move || {
            let counter = counter.clone();
            async move {
                *counter.lock().unwrap() += 1;
                Json(json!({"answer": "", "retrieved_facts": []}))
            }
        }),
    ))
    .await;

    assert!(matches!(client.query("").await, Err(Error::Validation(_))));
    assert_eq!(*hits.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_import_sends_multipart_and_type() {
    let seen: Arc<Mutex<Vec<(String, Option<String>, Option<String>, Vec<u8>)>>> =
        Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let client = serve(Router::new().route(
        "/import",
        post(
            move |Query(params): Query<ImportParams>, mut multipart: Multipart| {
                let recorder = recorder.clone();
                async move {
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        let name = field.name().map(str::to_string);
                        let file_name = field.file_name().map(str::to_string);
                        let bytes = field.bytes().await.unwrap().to_vec();
                        recorder
                            .lock()
                            .unwrap()
                            .push((params.kind.clone(), name, file_name, bytes));
                    }
                    Json(json!({
                        "status": "processing_started",
                        "message": "Import started in background"
                    }))
                }
            },
        ),
    ))
    .await;

    let upload = Upload::new("conversations.json", br#"[{"title":"hi"}]"#.to_vec());
    let ack = client
        .import_data(upload, ImportSource::Claude)
        .await
        .unwrap();
    assert_eq!(ack.status(), Some("processing_started"));

    let parts = seen.lock().unwrap();
    assert_eq!(parts.len(), 1);
    let (kind, name, file_name, bytes) = &parts[0];
    assert_eq!(kind, "claude");
    assert_eq!(name.as_deref(), Some("file"));
    assert_eq!(file_name.as_deref(), Some("conversations.json"));
    assert_eq!(bytes.as_slice(), br#"[{"title":"hi"}]"#);
}

#[tokio::test]
async fn test_non_success_status_is_backend_error() {
    let client = serve(
        Router::new()
            .route(
                "/stats",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "Components not initialized") }),
            )
            .route(
                "/import",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        "Invalid type. Must be 'chatgpt' or 'claude'",
                    )
                }),
            ),
    )
    .await;

    match client.get_stats().await {
        Err(Error::Backend { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "Components not initialized");
        }
        other => panic!("expected backend error, got {other:?}"),
    }

    let err = client
        .import_data(Upload::new("x.json", b"{}".to_vec()), ImportSource::ChatGpt)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let client = serve(
        Router::new()
            .route("/stats", get(|| async { "this is not json" }))
            .route("/facts", get(|| async { Json(json!({"facts": []})) })),
    )
    .await;

    assert!(matches!(client.get_stats().await, Err(Error::Decode(_))));
    assert!(matches!(client.get_facts(5, 0).await, Err(Error::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = MemoryClient::new(ClientConfig::new(format!("http://{addr}"))).unwrap();
    assert!(matches!(client.get_stats().await, Err(Error::Network(_))));
}

#[tokio::test]
async fn test_configured_timeout_fails_instead_of_hanging() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let router = Router::new().route(
            "/stats",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(json!({"total_facts": 1, "storage_type": "mock"}))
            }),
        );
        axum::serve(listener, router).await.unwrap();
    });

    let client = MemoryClient::new(
        ClientConfig::new(format!("http://{addr}")).with_timeout(Duration::from_millis(200)),
    )
    .unwrap();
    assert!(matches!(client.get_stats().await, Err(Error::Network(_))));
}
