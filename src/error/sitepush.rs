use axum::extract::rejection::JsonRejection;
use axum::{Json, http::StatusCode, response::IntoResponse};
use sitepush_schema::ErrorResponse;
use thiserror::Error as ThisError;

use super::IsRetryable;
use super::oauth::OauthError;

#[derive(Debug, ThisError)]
pub enum SitepushError {
    /// Operator setup is missing: no client identity or no active credential.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider rejected an exchange or submission.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The refresh grant failed; re-consent is usually required.
    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error(transparent)]
    Oauth(#[from] OauthError),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl SitepushError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SitepushError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for SitepushError {
    fn from(rejection: JsonRejection) -> Self {
        SitepushError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for SitepushError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl IsRetryable for SitepushError {
    fn is_retryable(&self) -> bool {
        match self {
            SitepushError::ReqwestError(e) => e.is_timeout() || e.is_connect(),
            SitepushError::Oauth(e) => e.is_retryable(),
            _ => false,
        }
    }
}
