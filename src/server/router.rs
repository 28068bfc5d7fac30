use crate::config::GoogleResolvedConfig;
use crate::db::DbActorHandle;
use crate::error::SitepushError;
use crate::events::EventSink;
use crate::google::{OauthFlow, SubmissionPipeline, TokenRefresher, build_http_client};
use crate::server::routes::{indexing, oauth, settings};

use axum::{
    Router,
    extract::Request,
    http::{
        HeaderName, HeaderValue, Method, StatusCode, Version,
        header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    },
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const X_CLIENT_INFO: HeaderName = HeaderName::from_static("x-client-info");
const APIKEY: HeaderName = HeaderName::from_static("apikey");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Shared handler state. Holds no credential data; every request re-reads the store.
#[derive(Clone)]
pub struct SitepushState {
    pub db: DbActorHandle,
    pub google: Arc<GoogleResolvedConfig>,
    pub client: reqwest::Client,
    pub events: EventSink,
}

impl SitepushState {
    pub fn new(
        db: DbActorHandle,
        google: GoogleResolvedConfig,
        events: EventSink,
    ) -> Result<Self, SitepushError> {
        let client = build_http_client(&google)?;
        Ok(Self {
            db,
            google: Arc::new(google),
            client,
            events,
        })
    }

    pub fn token_refresher(&self) -> TokenRefresher {
        TokenRefresher::new(
            self.google.clone(),
            self.db.clone(),
            self.client.clone(),
            self.events.clone(),
        )
    }

    pub fn oauth_flow(&self) -> OauthFlow {
        OauthFlow::new(
            self.google.clone(),
            self.db.clone(),
            self.client.clone(),
            self.events.clone(),
        )
    }

    pub fn submission_pipeline(&self) -> SubmissionPipeline {
        SubmissionPipeline::new(
            self.google.clone(),
            self.db.clone(),
            self.client.clone(),
            self.events.clone(),
        )
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let path = uri.path();
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

/// Browser-facing CORS: any origin, answered preflights for every route.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, X_CLIENT_INFO, APIKEY, CONTENT_TYPE])
}

pub fn sitepush_router(state: SitepushState) -> Router {
    Router::new()
        .merge(oauth::router())
        .merge(indexing::router())
        .merge(settings::router())
        .fallback(not_found_handler)
        .with_state(state)
        .layer(cors_layer())
        .layer(middleware::from_fn(access_log))
}
