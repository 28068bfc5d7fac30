use super::oauth::endpoints::GoogleOauthEndpoints;
use crate::config::GoogleResolvedConfig;
use crate::db::{CredentialPatch, DbActorHandle, DbCredential};
use crate::error::SitepushError;
use crate::events::{EventSink, SitepushEvent};
use chrono::{DateTime, Duration, Utc};
use oauth2::TokenResponse;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tokens expiring within this window are refreshed before use.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Whether a token expiring at `expires_at` must be refreshed at `now`.
pub fn needs_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - now < Duration::seconds(REFRESH_MARGIN_SECS)
}

/// Hands out a usable access token for the active credential, refreshing it just in time.
///
/// Holds no token cache: every call re-reads the store, so concurrent callers at worst
/// perform a redundant refresh.
#[derive(Clone)]
pub struct TokenRefresher {
    cfg: Arc<GoogleResolvedConfig>,
    db: DbActorHandle,
    http: reqwest::Client,
    events: EventSink,
}

impl TokenRefresher {
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

    /// Return an access token valid for at least [`REFRESH_MARGIN_SECS`].
    pub async fn ensure_valid_access_token(&self) -> Result<String, SitepushError> {
        let credential = self.db.get_active_credential().await?.ok_or_else(|| {
            SitepushError::Configuration(
                "Google Search Console is not connected: no active credential".to_string(),
            )
        })?;

        let now = Utc::now();
        if !needs_refresh(credential.token_expires_at, now) {
            debug!(
                credential_id = credential.id,
                expires_at = %credential.token_expires_at,
                "stored access token still valid"
            );
            return Ok(credential.access_token);
        }

        self.refresh(&credential).await
    }

    async fn refresh(&self, credential: &DbCredential) -> Result<String, SitepushError> {
        let token = GoogleOauthEndpoints::refresh_access_token(
            &self.cfg,
            &credential.client_id,
            &credential.client_secret,
            &credential.refresh_token,
            &self.http,
        )
        .await
        .map_err(|e| {
            warn!(credential_id = credential.id, error = %e, "access token refresh failed");
            SitepushError::TokenRefresh(e.to_string())
        })?;

        let expires_in = token.expires_in().ok_or_else(|| {
            SitepushError::TokenRefresh("token response is missing expires_in".to_string())
        })?;
        let expires_in = Duration::from_std(expires_in)
            .map_err(|e| SitepushError::TokenRefresh(format!("invalid expires_in: {e}")))?;
        let expires_at = Utc::now().checked_add_signed(expires_in).ok_or_else(|| {
            SitepushError::TokenRefresh(format!("expires_in out of range: {expires_in}"))
        })?;
        let access_token = token.access_token().secret().clone();

        let patch = CredentialPatch {
            access_token: Some(access_token.clone()),
            refresh_token: token.refresh_token().map(|rt| rt.secret().clone()),
            token_expires_at: Some(expires_at),
            ..Default::default()
        };
        self.db.patch_credential(credential.id, patch).await?;

        info!(
            credential_id = credential.id,
            expires_at = %expires_at,
            "access token refreshed"
        );
        self.events.notify(SitepushEvent::TokenRefreshed {
            credential_id: credential.id,
            expires_at,
        });
        Ok(access_token)
    }
}
