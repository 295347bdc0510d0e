#![cfg(feature = "server")]

use adspend::{
    api_routes, AccessPolicy, AppState, Entry, EntryStore, MediaType, MemoryStore, Snapshot,
    StoreError,
};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(policy: AccessPolicy) -> Router {
    Router::new().nest(
        "/api",
        api_routes(AppState::new(Box::new(MemoryStore::new()), policy)),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post(uri: &str, body: Value, password: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(pw) = password {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {pw}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn entry_json(id: &str, media: &str, month: &str, amount: &str) -> Value {
    json!({
        "id": id,
        "vendor": "KXLY",
        "location": "Spokane",
        "month": month,
        "year": "2026",
        "mediaType": media,
        "amount": amount,
    })
}

#[tokio::test]
async fn get_on_fresh_store_returns_empty_collection() {
    let app = router(AccessPolicy::Open);
    let (status, body) = send(&app, get("/api/entries")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "entries": [] }));
}

#[tokio::test]
async fn save_then_update_then_delete() {
    let app = router(AccessPolicy::Open);

    let (status, body) = send(
        &app,
        post(
            "/api/entries",
            json!({ "action": "save", "entry": entry_json("1", "Radio", "January", "100.50") }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        post(
            "/api/entries",
            json!({ "action": "save", "entry": entry_json("1", "Radio", "January", "200.00") }),
            None,
        ),
    )
    .await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["entries"][0]["amount"], "200.00");

    let (status, body) = send(
        &app,
        post("/api/entries", json!({ "action": "delete", "id": "1" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "entries": [] }));
}

#[tokio::test]
async fn other_methods_are_rejected() {
    let app = router(AccessPolicy::Open);
    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let request = Request::builder()
            .method(method)
            .uri("/api/entries")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }
}

#[tokio::test]
async fn head_is_rejected_like_other_methods() {
    let app = router(AccessPolicy::Open);
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/api/entries")
        .body(Body::empty())
        .expect("request");

    let response = app.clone().oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = router(AccessPolicy::Open);
    let (status, body) = send(
        &app,
        post("/api/entries", json!({ "action": "truncate" }), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn writes_need_password_when_configured() {
    let app = router(AccessPolicy::with_password("bursch"));
    let save = json!({ "action": "save", "entry": entry_json("1", "Radio", "May", "10") });

    let (status, body) = send(&app, post("/api/entries", save.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let (status, _) = send(&app, post("/api/entries", save.clone(), Some("nope"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Reads stay public
    let (status, body) = send(&app, get("/api/entries")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], json!([]));

    let (status, body) = send(&app, post("/api/entries", save, Some("bursch"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"][0]["id"], "1");
}

#[tokio::test]
async fn login_checks_password() {
    let app = router(AccessPolicy::with_password("bursch"));

    let (status, body) = send(&app, post("/api/login", json!({ "password": "bursch" }), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(&app, post("/api/login", json!({ "password": "x" }), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Incorrect password" }));
}

#[tokio::test]
async fn summary_applies_filters() {
    let app = router(AccessPolicy::Open);
    for (id, media, amount) in [("1", "Radio", "50"), ("2", "Digital", "75")] {
        let save = json!({ "action": "save", "entry": entry_json(id, media, "March", amount) });
        send(&app, post("/api/entries", save, None)).await;
    }

    let (status, body) = send(&app, get("/api/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 125.0);
    assert_eq!(body["breakdown"]["columns"], json!(["March 2026"]));
    assert_eq!(body["breakdown"]["rows"][0]["mediaType"], "Radio");
    assert_eq!(body["breakdown"]["rows"][0]["cells"], json!([50.0]));
    assert_eq!(body["breakdown"]["rows"][1]["cells"], json!([75.0]));
    assert_eq!(body["breakdown"]["columnTotals"], json!([125.0]));
    assert_eq!(body["facets"]["vendors"], json!(["KXLY"]));

    let (_, body) = send(&app, get("/api/summary?mediaType=Digital")).await;
    assert_eq!(body["total"], 75.0);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["filters"]["vendor"], "all");
}

#[tokio::test]
async fn export_is_a_json_download() {
    let app = router(AccessPolicy::Open);
    let save = json!({ "action": "save", "entry": entry_json("1", "Radio", "May", "10") });
    send(&app, post("/api/entries", save, None)).await;

    let response = app.clone().oneshot(get("/api/export")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert_eq!(
        disposition.as_deref(),
        Some("attachment; filename=\"ad-spend-data.json\"")
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let entries: Vec<Entry> = serde_json::from_slice(&bytes).expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].media_type, MediaType::Radio);
}

/// Backend whose every call fails
struct BrokenStore;

impl EntryStore for BrokenStore {
    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Err(StoreError::Poisoned)
    }

    fn compare_and_swap(&self, _: u64, _: &[Entry]) -> Result<bool, StoreError> {
        Err(StoreError::Poisoned)
    }

    fn write(&self, _: &[Entry]) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
}

#[tokio::test]
async fn storage_failures_map_to_fixed_500_messages() {
    let app = Router::new().nest(
        "/api",
        api_routes(AppState::new(Box::new(BrokenStore), AccessPolicy::Open)),
    );

    let (status, body) = send(&app, get("/api/entries")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch entries" }));

    let (status, body) = send(
        &app,
        post("/api/entries", json!({ "action": "delete", "id": "1" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to update entries" }));
}

#[tokio::test]
async fn health_check() {
    let app = router(AccessPolicy::Open);
    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "data": "OK" }));
}
