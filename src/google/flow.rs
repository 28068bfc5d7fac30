use super::oauth::endpoints::GoogleOauthEndpoints;
use crate::config::GoogleResolvedConfig;
use crate::db::{AuthorizationGrant, DbActorHandle};
use crate::error::SitepushError;
use crate::events::{EventSink, SitepushEvent};
use chrono::{Duration, Utc};
use oauth2::{AuthorizationCode, TokenResponse};
use sitepush_schema::OauthCallbackRequest;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Consent URL construction and authorization-code completion.
#[derive(Clone)]
pub struct OauthFlow {
    cfg: Arc<GoogleResolvedConfig>,
    db: DbActorHandle,
    http: reqwest::Client,
    events: EventSink,
}

impl OauthFlow {
    pub fn new(
        cfg: Arc<GoogleResolvedConfig>,
        db: DbActorHandle,
        http: reqwest::Client,
        events: EventSink,
    ) -> Self {
        Self {
            cfg,
            db,
            http,
            events,
        }
    }

    pub fn authorization_url(&self) -> Result<Url, SitepushError> {
        GoogleOauthEndpoints::authorization_url(&self.cfg)
    }

    /// Exchange the callback code and persist the credential. Returns the credential id.
    ///
    /// The stored row is overwritten in place (keeping `property_url` and flags), so repeated
    /// consents never create a second credential.
    pub async fn complete_authorization(
        &self,
        callback: OauthCallbackRequest,
    ) -> Result<i64, SitepushError> {
        if let Some(error) = callback.error.as_deref().filter(|e| !e.trim().is_empty()) {
            let detail = callback
                .error_description
                .as_deref()
                .map(|d| format!("{error}: {d}"))
                .unwrap_or_else(|| error.to_string());
            return Err(SitepushError::InvalidRequest(format!(
                "authorization was denied by the provider: {detail}"
            )));
        }

        let code = callback
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                SitepushError::InvalidRequest("missing authorization code".to_string())
            })?;

        if !self.cfg.has_client_identity() {
            return Err(SitepushError::Configuration(
                "Google OAuth client id/secret are not configured".to_string(),
            ));
        }

        let token = GoogleOauthEndpoints::exchange_authorization_code(
            &self.cfg,
            AuthorizationCode::new(code.to_string()),
            &self.http,
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "authorization code exchange failed");
            SitepushError::Upstream(e.to_string())
        })?;

        let refresh_token = token
            .refresh_token()
            .map(|rt| rt.secret().clone())
            .ok_or_else(|| {
                SitepushError::Upstream("token response is missing refresh_token".to_string())
            })?;
        let expires_in = token.expires_in().ok_or_else(|| {
            SitepushError::Upstream("token response is missing expires_in".to_string())
        })?;
        let expires_in = Duration::from_std(expires_in)
            .map_err(|e| SitepushError::Upstream(format!("invalid expires_in: {e}")))?;
        let token_expires_at = Utc::now().checked_add_signed(expires_in).ok_or_else(|| {
            SitepushError::Upstream(format!("expires_in out of range: {expires_in}"))
        })?;

        let grant = AuthorizationGrant {
            client_id: self.cfg.client_id.clone(),
            client_secret: self.cfg.client_secret.clone(),
            access_token: token.access_token().secret().clone(),
            refresh_token,
            token_expires_at,
        };
        let credential_id = self.db.store_authorization(grant).await?;

        info!(
            credential_id,
            expires_at = %token_expires_at,
            "Google Search Console authorization stored"
        );
        self.events.notify(SitepushEvent::AuthorizationCompleted {
            credential_id,
            expires_at: token_expires_at,
        });
        Ok(credential_id)
    }
}
