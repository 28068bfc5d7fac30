use crate::error::SitepushError;
use crate::server::router::SitepushState;
use axum::extract::rejection::JsonRejection;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use sitepush_schema::{
    AuthUrlResponse, OauthCallbackRequest, RefreshTokenResponse, SuccessResponse,
};

pub fn router() -> Router<SitepushState> {
    Router::new()
        .route(
            "/google-oauth-init",
            get(google_oauth_init).post(google_oauth_init),
        )
        .route("/google-oauth-callback", post(google_oauth_callback))
        .route("/google-refresh-token", post(google_refresh_token))
}

/// GET|POST /google-oauth-init
pub async fn google_oauth_init(
    State(state): State<SitepushState>,
) -> Result<Json<AuthUrlResponse>, SitepushError> {
    let url = state.oauth_flow().authorization_url()?;
    Ok(Json(AuthUrlResponse {
        auth_url: url.to_string(),
    }))
}

/// POST /google-oauth-callback
///
/// Body is relayed by the consent landing page: `{code}` or `{error, error_description}`.
pub async fn google_oauth_callback(
    State(state): State<SitepushState>,
    payload: Result<Json<OauthCallbackRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, SitepushError> {
    let Json(callback) = payload?;
    state.oauth_flow().complete_authorization(callback).await?;
    Ok(Json(SuccessResponse::OK))
}

/// POST /google-refresh-token
pub async fn google_refresh_token(
    State(state): State<SitepushState>,
) -> Result<Json<RefreshTokenResponse>, SitepushError> {
    let access_token = state.token_refresher().ensure_valid_access_token().await?;
    Ok(Json(RefreshTokenResponse {
        success: true,
        access_token,
    }))
}
