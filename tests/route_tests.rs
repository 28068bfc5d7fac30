mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use common::{MockGoogle, make_cfg, seed_credential, set_flags, spawn_db};
use serde_json::{Value, json};
use sitepush::db::DbActorHandle;
use sitepush::events::NoopNotifier;
use sitepush::{SitepushState, sitepush_router};
use std::sync::Arc;
use tower::ServiceExt;

async fn app_for(mock: &MockGoogle, db: &DbActorHandle) -> Router {
    let base = mock.spawn().await;
    let state = SitepushState::new(db.clone(), make_cfg(&base), Arc::new(NoopNotifier)).unwrap();
    sitepush_router(state)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn preflight_returns_empty_ok_with_cors_headers() {
    let mock = MockGoogle::default();
    let db = spawn_db("route_preflight").await;
    let app = app_for(&mock, &db).await;

    for path in ["/request-url-indexing", "/google-oauth-callback", "/google-search-console/settings"] {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri(path)
            .header(header::ORIGIN, "https://admin.example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization, content-type")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let headers = resp.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        for expected in ["authorization", "x-client-info", "apikey", "content-type"] {
            assert!(allowed.contains(expected), "{allowed}");
        }
        assert!(headers.contains_key("x-request-id"));
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn oauth_init_returns_auth_url() {
    let mock = MockGoogle::default();
    let db = spawn_db("route_oauth_init").await;
    let app = app_for(&mock, &db).await;

    for method in [Method::GET, Method::POST] {
        let resp = app
            .clone()
            .oneshot(empty_request(method, "/google-oauth-init"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let auth_url = body["authUrl"].as_str().unwrap();
        assert!(auth_url.starts_with("http://oauth.test/authorize?"));
        assert!(auth_url.contains("access_type=offline"));
    }
}

#[tokio::test]
async fn errors_use_error_envelope_and_status_classes() {
    let mock = MockGoogle::default();
    let db = spawn_db("route_errors").await;
    let app = app_for(&mock, &db).await;

    // Validation failure: 400.
    let resp = app
        .clone()
        .oneshot(json_request(Method::POST, "/request-url-indexing", json!({"urls": []})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].as_str().unwrap().contains("urls"));

    // `urls` not a list: 400.
    let resp = app
        .clone()
        .oneshot(json_request(Method::POST, "/request-url-indexing", json!({"urls": "https://example.com"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());

    // Not connected: configuration error, 500.
    let resp = app
        .clone()
        .oneshot(empty_request(Method::POST, "/google-refresh-token"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Configuration error"));

    // Missing code: 400.
    let resp = app
        .clone()
        .oneshot(json_request(Method::POST, "/google-oauth-callback", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(mock.captured().is_empty());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let mock = MockGoogle::default();
    let db = spawn_db("route_not_found").await;
    let app = app_for(&mock, &db).await;

    let resp = app
        .oneshot(empty_request(Method::GET, "/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_url_indexing_reports_partial_batch_as_success() {
    let mock = MockGoogle::default();
    mock.reject_url("https://example.com/b");
    mock.reject_url("https://example.com/a");
    let db = spawn_db("route_batch").await;
    seed_credential(&db, "valid-access", "R1", Utc::now() + Duration::hours(1)).await;
    let app = app_for(&mock, &db).await;

    let resp = app
        .oneshot(json_request(
            Method::POST,
            "/request-url-indexing",
            json!({"urls": ["https://example.com/a", "https://example.com/b"]}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["successCount"], 0);
    assert_eq!(body["errorCount"], 2);
    assert_eq!(body["total"], 2);
    assert_eq!(body["results"][0]["success"], false);
    assert!(body["results"][0]["error"].is_string());
}

#[tokio::test]
async fn refresh_endpoint_returns_valid_token() {
    let mock = MockGoogle::default();
    let db = spawn_db("route_refresh").await;
    seed_credential(&db, "stale", "R1", Utc::now() - Duration::minutes(5)).await;
    let app = app_for(&mock, &db).await;

    let resp = app
        .oneshot(empty_request(Method::POST, "/google-refresh-token"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body, json!({"success": true, "accessToken": "fresh-access-token"}));
}

#[tokio::test]
async fn settings_roundtrip_without_secrets() {
    let mock = MockGoogle::default();
    let db = spawn_db("route_settings").await;
    let app = app_for(&mock, &db).await;

    let resp = app
        .clone()
        .oneshot(empty_request(Method::GET, "/google-search-console/settings"))
        .await
        .unwrap();
    assert_eq!(
        body_json(resp).await,
        json!({"connected": false, "settings": null})
    );

    seed_credential(&db, "secret-access", "secret-refresh", Utc::now() + Duration::hours(1)).await;
    let resp = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            "/google-search-console/settings",
            json!({"propertyUrl": "https://example.com/", "autoSubmitOnPublish": true}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["settings"]["propertyUrl"], "https://example.com/");
    assert_eq!(body["settings"]["autoSubmitOnPublish"], true);
    assert_eq!(body["settings"]["autoSubmitSitemap"], false);

    let resp = app
        .clone()
        .oneshot(empty_request(Method::GET, "/google-search-console/settings"))
        .await
        .unwrap();
    let raw = body_json(resp).await;
    assert_eq!(raw["connected"], true);
    let text = raw.to_string();
    assert!(!text.contains("secret-access"));
    assert!(!text.contains("secret-refresh"));
    assert!(!text.contains("stored-client-secret"));

    let resp = app
        .oneshot(json_request(Method::PATCH, "/google-search-console/settings", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn track_then_list_indexing_status() {
    let mock = MockGoogle::default();
    let db = spawn_db("route_track").await;
    let id = seed_credential(&db, "valid-access", "R1", Utc::now() + Duration::hours(1)).await;
    set_flags(&db, id, None, true, false).await;
    let app = app_for(&mock, &db).await;

    let resp = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/seo-indexing-status/track",
            json!({"url": "https://example.com/new", "type": "blog_post", "reference_id": "p-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["entry"]["indexingStatus"], "PENDING");
    assert_eq!(body["entry"]["pageType"], "blog_post");

    let resp = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auto-submit-new-content",
            json!({"url": "https://example.com/new", "type": "blog_post", "reference_id": "p-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["url"], "https://example.com/new");

    let resp = app
        .oneshot(empty_request(Method::GET, "/seo-indexing-status"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["indexingStatus"], "SUBMITTED");
    assert_eq!(entries[0]["referenceId"], "p-1");
}
