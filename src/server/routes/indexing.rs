use crate::error::SitepushError;
use crate::server::router::SitepushState;
use axum::extract::rejection::JsonRejection;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use sitepush_schema::{
    AutoSubmitResponse, BatchResponse, CheckUrlRequest, CheckUrlResponse, ContentRef,
    IndexingEntriesResponse, RequestIndexingRequest, SitemapSubmitResponse, TrackUrlResponse,
};

pub fn router() -> Router<SitepushState> {
    Router::new()
        .route("/request-url-indexing", post(request_url_indexing))
        .route("/submit-sitemap-to-google", post(submit_sitemap_to_google))
        .route("/auto-submit-new-content", post(auto_submit_new_content))
        .route("/seo-indexing-status", get(list_indexing_status))
        .route("/seo-indexing-status/track", post(track_url))
        .route("/check-url-indexing", post(check_url_indexing))
}

/// POST /request-url-indexing
///
/// Always `success: true` once the batch ran; per-URL failures live in `results`.
pub async fn request_url_indexing(
    State(state): State<SitepushState>,
    payload: Result<Json<RequestIndexingRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, SitepushError> {
    let Json(request) = payload?;
    let batch = state.submission_pipeline().submit_urls(request.urls).await?;
    Ok(Json(BatchResponse {
        success: true,
        batch,
    }))
}

/// POST /submit-sitemap-to-google
pub async fn submit_sitemap_to_google(
    State(state): State<SitepushState>,
) -> Result<Json<SitemapSubmitResponse>, SitepushError> {
    Ok(Json(state.submission_pipeline().submit_sitemap().await?))
}

/// POST /auto-submit-new-content
pub async fn auto_submit_new_content(
    State(state): State<SitepushState>,
    payload: Result<Json<ContentRef>, JsonRejection>,
) -> Result<Json<AutoSubmitResponse>, SitepushError> {
    let Json(content) = payload?;
    Ok(Json(state.submission_pipeline().auto_submit(content).await?))
}

/// GET /seo-indexing-status
pub async fn list_indexing_status(
    State(state): State<SitepushState>,
) -> Result<Json<IndexingEntriesResponse>, SitepushError> {
    let entries = state
        .db
        .list_indexing_status()
        .await?
        .iter()
        .map(|row| row.to_view())
        .collect();
    Ok(Json(IndexingEntriesResponse { entries }))
}

/// POST /seo-indexing-status/track
pub async fn track_url(
    State(state): State<SitepushState>,
    payload: Result<Json<ContentRef>, JsonRejection>,
) -> Result<Json<TrackUrlResponse>, SitepushError> {
    let Json(content) = payload?;
    let entry = state.submission_pipeline().track_url(content).await?;
    Ok(Json(TrackUrlResponse {
        success: true,
        entry: entry.to_view(),
    }))
}

/// POST /check-url-indexing
pub async fn check_url_indexing(
    State(state): State<SitepushState>,
    payload: Result<Json<CheckUrlRequest>, JsonRejection>,
) -> Result<Json<CheckUrlResponse>, SitepushError> {
    let Json(request) = payload?;
    let metadata = state.submission_pipeline().inspect_url(&request.url).await?;
    Ok(Json(CheckUrlResponse {
        success: true,
        url: request.url.trim().to_string(),
        metadata,
    }))
}
