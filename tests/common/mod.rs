#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use sitepush::config::{GoogleConfig, GoogleResolvedConfig};
use sitepush::db::{AuthorizationGrant, CredentialPatch, DbActorHandle};
use sitepush::events::{Notifier, SitepushEvent};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tokio::net::TcpListener;
use url::Url;

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const REDIRECT_URI: &str = "https://admin.example.com/admin/google-callback";

#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body).into_owned().collect()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("captured body is JSON")
    }

    pub fn bearer(&self) -> Option<String> {
        self.headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }
}

/// Programmable stand-in for the Google token, Indexing and Search Console endpoints.
#[derive(Clone, Default)]
pub struct MockGoogle {
    captured: Arc<Mutex<Vec<Captured>>>,
    token_reply: Arc<Mutex<Option<(StatusCode, Value)>>>,
    rejected_urls: Arc<Mutex<HashSet<String>>>,
    publish_text: Arc<Mutex<Option<String>>>,
    metadata_failures: Arc<AtomicUsize>,
}

impl MockGoogle {
    pub fn reply_token(&self, status: StatusCode, body: Value) {
        *self.token_reply.lock().unwrap() = Some((status, body));
    }

    pub fn reject_url(&self, url: &str) {
        self.rejected_urls.lock().unwrap().insert(url.to_string());
    }

    /// Answer publishes with 200 and a plain-text body.
    pub fn reply_publish_text(&self, body: &str) {
        *self.publish_text.lock().unwrap() = Some(body.to_string());
    }

    pub fn fail_metadata_times(&self, times: usize) {
        self.metadata_failures.store(times, Ordering::SeqCst);
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn captured_at(&self, path_prefix: &str) -> Vec<Captured> {
        self.captured()
            .into_iter()
            .filter(|c| c.path.starts_with(path_prefix))
            .collect()
    }

    pub fn token_calls(&self) -> Vec<Captured> {
        self.captured_at("/token")
    }

    pub fn publish_calls(&self) -> Vec<Captured> {
        self.captured_at("/v3/urlNotifications:publish")
    }

    fn record(&self, method: Method, uri: &Uri, headers: HeaderMap, body: &[u8]) {
        self.captured.lock().unwrap().push(Captured {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            body: body.to_vec(),
        });
    }

    pub async fn spawn(&self) -> Url {
        let app = Router::new()
            .route("/token", post(token_handler))
            .route("/v3/urlNotifications:publish", post(publish_handler))
            .route("/v3/urlNotifications/metadata", get(metadata_handler))
            .route(
                "/webmasters/v3/sites/{site}/sitemaps/{feed}",
                put(sitemap_handler),
            )
            .with_state(self.clone());

        spawn_test_server(app).await
    }
}

async fn token_handler(
    State(mock): State<MockGoogle>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(Method::POST, &uri, headers, &body);
    let reply = mock.token_reply.lock().unwrap().clone();
    let (status, body) = reply.unwrap_or_else(|| {
        (
            StatusCode::OK,
            json!({
                "access_token": "fresh-access-token",
                "expires_in": 3600,
                "token_type": "Bearer",
            }),
        )
    });
    (status, Json(body)).into_response()
}

async fn publish_handler(
    State(mock): State<MockGoogle>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.record(Method::POST, &uri, headers, &body);
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let url = payload["url"].as_str().unwrap_or_default().to_string();

    if mock.rejected_urls.lock().unwrap().contains(&url) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": {"code": 403, "message": "Permission denied. Failed to verify the URL ownership.", "status": "PERMISSION_DENIED"}
            })),
        )
            .into_response();
    }

    if let Some(text) = mock.publish_text.lock().unwrap().clone() {
        return (StatusCode::OK, text).into_response();
    }

    Json(json!({
        "urlNotificationMetadata": {
            "url": url,
            "latestUpdate": {
                "url": url,
                "type": "URL_UPDATED",
                "notifyTime": "2024-05-01T10:00:00.000Z"
            }
        }
    }))
    .into_response()
}

async fn metadata_handler(
    State(mock): State<MockGoogle>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    mock.record(Method::GET, &uri, headers, &[]);

    let remaining = mock.metadata_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        mock.metadata_failures.store(remaining - 1, Ordering::SeqCst);
        return (StatusCode::SERVICE_UNAVAILABLE, "backend unavailable").into_response();
    }

    let url = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect::<HashMap<String, String>>()
        })
        .and_then(|q| q.get("url").cloned())
        .unwrap_or_default();

    Json(json!({
        "url": url,
        "latestUpdate": {
            "url": url,
            "type": "URL_UPDATED",
            "notifyTime": "2024-05-01T10:00:00.000Z"
        }
    }))
    .into_response()
}

async fn sitemap_handler(
    State(mock): State<MockGoogle>,
    uri: Uri,
    headers: HeaderMap,
) -> StatusCode {
    mock.record(Method::PUT, &uri, headers, &[]);
    StatusCode::NO_CONTENT
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

pub fn make_cfg(base: &Url) -> GoogleResolvedConfig {
    let mut cfg = GoogleConfig {
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        redirect_uri: Url::parse(REDIRECT_URI).unwrap(),
        auth_url: Url::parse("http://oauth.test/authorize").unwrap(),
        token_url: base.join("/token").unwrap(),
        indexing_api_url: base.clone(),
        webmasters_api_url: base.clone(),
        ..Default::default()
    }
    .resolve();
    cfg.request_timeout = Duration::from_secs(5);
    cfg
}

pub fn temp_database_url(tag: &str) -> String {
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    tag.hash(&mut hasher);
    let db_path = std::env::temp_dir().join(format!("sitepush_{tag}_{}.sqlite", hasher.finish()));
    format!("sqlite:{}", db_path.to_str().unwrap())
}

pub async fn spawn_db(tag: &str) -> DbActorHandle {
    sitepush::db::spawn(&temp_database_url(tag)).await
}

/// Store an active credential whose access token expires at `expires_at`.
pub async fn seed_credential(
    db: &DbActorHandle,
    access_token: &str,
    refresh_token: &str,
    expires_at: DateTime<Utc>,
) -> i64 {
    db.store_authorization(AuthorizationGrant {
        client_id: "stored-client-id".to_string(),
        client_secret: "stored-client-secret".to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        token_expires_at: expires_at,
    })
    .await
    .expect("seed credential")
}

pub async fn set_flags(
    db: &DbActorHandle,
    id: i64,
    property_url: Option<&str>,
    auto_submit_on_publish: bool,
    auto_submit_sitemap: bool,
) {
    db.patch_credential(
        id,
        CredentialPatch {
            property_url: property_url.map(str::to_string),
            auto_submit_on_publish: Some(auto_submit_on_publish),
            auto_submit_sitemap: Some(auto_submit_sitemap),
            ..Default::default()
        },
    )
    .await
    .expect("patch flags");
}

#[derive(Default)]
pub struct CaptureNotifier {
    events: Mutex<Vec<SitepushEvent>>,
}

impl CaptureNotifier {
    pub fn events(&self) -> Vec<SitepushEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for CaptureNotifier {
    fn notify(&self, event: SitepushEvent) {
        self.events.lock().unwrap().push(event);
    }
}
