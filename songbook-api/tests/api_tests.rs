//! Integration tests for songbook-api endpoints
//!
//! Each test builds the full router over a fresh in-memory SQLite catalog
//! and drives it with `oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use songbook_api::db::SqliteSongRepository;
use songbook_api::{build_router, AppState};
use songbook_common::db::init_memory_database;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app plus the pool behind it
async fn setup_app() -> (Router, SqlitePool) {
    let pool = init_memory_database()
        .await
        .expect("Should create in-memory database");
    let state = AppState::new(Arc::new(SqliteSongRepository::new(pool.clone())));
    (build_router(state), pool)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

fn song_body(group: &str, song: &str, text: &str) -> Value {
    json!({
        "group": group,
        "song": song,
        "releaseDate": "16.07.2006",
        "text": text,
        "link": "https://www.youtube.com/watch?v=Xsp3_a-PMTw"
    })
}

async fn create(app: &Router, group: &str, song: &str, text: &str) -> Value {
    let (status, body) = send(app, json_request("POST", "/songs", song_body(group, song, text))).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    body
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "songbook-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let (app, _pool) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/api/buildinfo")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
}

#[tokio::test]
async fn test_openapi_document_lists_catalog_paths() {
    let (app, _pool) = setup_app().await;

    let (status, body) = send(&app, test_request("GET", "/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().expect("paths object");
    for path in ["/songs", "/songs/{id}", "/songs/{id}/text", "/info"] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
}

// =============================================================================
// POST /songs
// =============================================================================

#[tokio::test]
async fn test_create_returns_full_record() {
    let (app, _pool) = setup_app().await;

    let body = create(&app, "Muse", "Supermassive Black Hole", "a\nb").await;

    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["group"], "Muse");
    assert_eq!(body["song"], "Supermassive Black Hole");
    assert_eq!(body["releaseDate"], "16.07.2006");
    assert_eq!(body["text"], "a\nb");
}

#[tokio::test]
async fn test_create_assigns_distinct_ids_for_duplicates() {
    let (app, _pool) = setup_app().await;

    let first = create(&app, "Muse", "Uprising", "x").await;
    let second = create(&app, "Muse", "Uprising", "x").await;

    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_create_malformed_json_is_400() {
    let (app, _pool) = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/songs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_missing_field_is_400() {
    let (app, _pool) = setup_app().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/songs", json!({"group": "Muse", "song": "Uprising"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_blank_group_is_400() {
    let (app, _pool) = setup_app().await;

    let (status, body) = send(&app, json_request("POST", "/songs", song_body("  ", "Uprising", ""))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "group must not be empty");
}

// =============================================================================
// GET /songs
// =============================================================================

#[tokio::test]
async fn test_list_defaults_and_order() {
    let (app, _pool) = setup_app().await;
    create(&app, "Radiohead", "Creep", "weirdo").await;
    create(&app, "Muse", "Uprising", "paranoia").await;
    create(&app, "Muse", "Hysteria", "it's bugging me").await;

    let (status, body) = send(&app, test_request("GET", "/songs")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["total_pages"], 1);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["song"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Hysteria", "Uprising", "Creep"]);
}

#[tokio::test]
async fn test_list_pagination_metadata() {
    let (app, _pool) = setup_app().await;
    for i in 0..5 {
        create(&app, "Muse", &format!("Song {}", i), "text").await;
    }

    let (status, body) = send(&app, test_request("GET", "/songs?page=3&limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 3);
    assert_eq!(body["total_items"], 5);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["song"], "Song 4");
}

#[tokio::test]
async fn test_list_page_past_end_is_empty() {
    let (app, _pool) = setup_app().await;
    create(&app, "Muse", "Uprising", "text").await;

    let (status, body) = send(&app, test_request("GET", "/songs?page=9")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total_items"], 1);
}

#[tokio::test]
async fn test_list_filters_by_group_and_text() {
    let (app, _pool) = setup_app().await;
    create(&app, "Muse", "Uprising", "They will not force us").await;
    create(&app, "Muse", "Starlight", "Far away, this ship is taking me").await;
    create(&app, "Radiohead", "Creep", "You're so very special").await;

    let (_, body) = send(&app, test_request("GET", "/songs?group=Muse&text=FORCE")).await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["data"][0]["song"], "Uprising");

    let (_, body) = send(&app, test_request("GET", "/songs?group=muse")).await;
    assert_eq!(body["total_items"], 0, "group filter is exact");
}

#[tokio::test]
async fn test_list_text_filter_ignores_cyrillic_case() {
    let (app, _pool) = setup_app().await;
    create(&app, "Кино", "Группа крови", "Теплое место\nОтпечатков наших ног").await;
    create(&app, "Muse", "Uprising", "plain words").await;

    // text=ТЕПЛОЕ
    let (status, body) = send(
        &app,
        test_request("GET", "/songs?text=%D0%A2%D0%95%D0%9F%D0%9B%D0%9E%D0%95"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["data"][0]["group"], "Кино");
}

#[tokio::test]
async fn test_list_empty_filter_values_are_ignored() {
    let (app, _pool) = setup_app().await;
    create(&app, "Muse", "Uprising", "text").await;

    let (status, body) = send(&app, test_request("GET", "/songs?group=&text=")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
}

#[tokio::test]
async fn test_list_text_wildcards_match_literally() {
    let (app, _pool) = setup_app().await;
    create(&app, "Muse", "Uprising", "plain words").await;
    create(&app, "Muse", "Percent", "100% real").await;

    let (_, body) = send(&app, test_request("GET", "/songs?text=%25")).await;

    assert_eq!(body["total_items"], 1);
    assert_eq!(body["data"][0]["song"], "Percent");
}

#[tokio::test]
async fn test_list_invalid_pagination_is_400() {
    let (app, _pool) = setup_app().await;

    for uri in ["/songs?page=0", "/songs?limit=0", "/songs?limit=101", "/songs?page=abc"] {
        let (status, body) = send(&app, test_request("GET", uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string());
    }
}

// =============================================================================
// GET /songs/{id} and /songs/{id}/text
// =============================================================================

#[tokio::test]
async fn test_get_song_by_id() {
    let (app, _pool) = setup_app().await;
    let created = create(&app, "Muse", "Uprising", "text").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, test_request("GET", &format!("/songs/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, _) = send(&app, test_request("GET", "/songs/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_text_default_page_has_two_verses() {
    let (app, _pool) = setup_app().await;
    let created = create(&app, "Muse", "Starlight", "one\ntwo\nthree").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, test_request("GET", &format!("/songs/{}/text", id))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["song"], "Starlight");
    assert_eq!(body["verses"], json!(["one", "two"]));
}

#[tokio::test]
async fn test_text_second_and_past_end_pages() {
    let (app, _pool) = setup_app().await;
    let created = create(&app, "Muse", "Starlight", "one\ntwo\nthree").await;
    let id = created["id"].as_i64().unwrap();

    let (_, body) = send(&app, test_request("GET", &format!("/songs/{}/text?page=2", id))).await;
    assert_eq!(body["verses"], json!(["three"]));

    let (status, body) = send(&app, test_request("GET", &format!("/songs/{}/text?page=3", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verses"], json!([]));
}

#[tokio::test]
async fn test_text_errors() {
    let (app, _pool) = setup_app().await;
    let created = create(&app, "Muse", "Starlight", "one").await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, test_request("GET", "/songs/abc/text")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, test_request("GET", &format!("/songs/{}/text?limit=0", id))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, test_request("GET", "/songs/999/text")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// =============================================================================
// PATCH /songs
// =============================================================================

#[tokio::test]
async fn test_patch_applies_only_first_populated_field() {
    let (app, _pool) = setup_app().await;
    create(&app, "Muse", "Uprising", "old text").await;

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/songs?group=Muse&song_name=Uprising",
            json!({"song": "Resistance", "text": "new text"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["song"], "Resistance");
    assert_eq!(body["text"], "old text");

    let (status, _) = send(&app, test_request("GET", "/info?group=Muse&song=Resistance")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_patch_empty_body_leaves_record_unchanged() {
    let (app, _pool) = setup_app().await;
    let created = create(&app, "Muse", "Uprising", "text").await;

    let (status, body) = send(
        &app,
        json_request("PATCH", "/songs?group=Muse&song_name=Uprising", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_patch_errors() {
    let (app, _pool) = setup_app().await;
    create(&app, "Muse", "Uprising", "text").await;

    let (status, _) = send(&app, json_request("PATCH", "/songs?group=Muse", json!({"text": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("PATCH", "/songs?group=Muse&song_name=Nope", json!({"text": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("PATCH")
        .uri("/songs?group=Muse&song_name=Uprising")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[1, 2"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// DELETE /songs
// =============================================================================

#[tokio::test]
async fn test_delete_then_lookup_is_404() {
    let (app, _pool) = setup_app().await;
    let created = create(&app, "Muse", "Uprising", "text").await;

    let (status, body) = send(&app, test_request("DELETE", "/songs?group=Muse&song_name=Uprising")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["song"], "Uprising");
    assert_eq!(body["id"], created["id"]);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, test_request("GET", "/info?group=Muse&song=Uprising")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, test_request("DELETE", "/songs?group=Muse&song_name=Uprising")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_duplicate_removes_lowest_id_first() {
    let (app, _pool) = setup_app().await;
    let first = create(&app, "Muse", "Uprising", "first").await;
    let second = create(&app, "Muse", "Uprising", "second").await;

    let (_, body) = send(&app, test_request("DELETE", "/songs?group=Muse&song_name=Uprising")).await;
    assert_eq!(body["id"], first["id"]);

    let (_, body) = send(&app, test_request("GET", "/info?group=Muse&song=Uprising")).await;
    assert_eq!(body["text"], second["text"]);
}

#[tokio::test]
async fn test_delete_missing_params_is_400() {
    let (app, _pool) = setup_app().await;

    let (status, body) = send(&app, test_request("DELETE", "/songs?song_name=Uprising")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "group and song_name parameters are required");
}

// =============================================================================
// GET /info
// =============================================================================

#[tokio::test]
async fn test_info_returns_details_without_id() {
    let (app, _pool) = setup_app().await;
    create(&app, "Muse", "Supermassive Black Hole", "verse").await;

    let (status, body) = send(
        &app,
        test_request("GET", "/info?group=Muse&song=Supermassive%20Black%20Hole"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["releaseDate"], "16.07.2006");
    assert_eq!(body["text"], "verse");
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn test_info_missing_or_blank_params_is_400() {
    let (app, _pool) = setup_app().await;

    for uri in ["/info", "/info?group=Muse", "/info?group=&song=Uprising"] {
        let (status, _) = send(&app, test_request("GET", uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

// =============================================================================
// Storage failures
// =============================================================================

#[tokio::test]
async fn test_storage_failure_is_500() {
    let (app, pool) = setup_app().await;
    pool.close().await;

    let (status, body) = send(&app, test_request("GET", "/songs")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("list_filtered"));
}

#[tokio::test]
async fn test_validation_runs_before_storage() {
    let (app, pool) = setup_app().await;
    pool.close().await;

    let (status, _) = send(&app, test_request("GET", "/songs?limit=500")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, test_request("GET", "/info?group=Muse")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
