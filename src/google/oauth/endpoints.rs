use super::GoogleTokenClient;
use crate::config::GoogleResolvedConfig;
use crate::error::{OauthError, SitepushError};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthType, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, RefreshToken, TokenUrl,
};
use tracing::info;
use url::Url;

/// Stateless Google OAuth endpoints built from resolved config.
///
/// A fresh oauth2 client is built per call because the refresh grant uses the client
/// identity stored with the credential, which may differ from the configured one.
pub struct GoogleOauthEndpoints;

impl GoogleOauthEndpoints {
    fn build_client(
        cfg: &GoogleResolvedConfig,
        client_id: &str,
        client_secret: &str,
    ) -> Result<GoogleTokenClient, OauthError> {
        let token_url =
            TokenUrl::new(cfg.token_url.to_string()).map_err(|e| OauthError::Other {
                message: format!("invalid token url: {e}"),
            })?;
        let redirect =
            RedirectUrl::new(cfg.redirect_uri.to_string()).map_err(|e| OauthError::Other {
                message: format!("invalid redirect uri: {e}"),
            })?;

        Ok(BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect))
    }

    /// Build the consent URL.
    ///
    /// `access_type=offline` is what makes Google issue a refresh token and `prompt=consent`
    /// forces it to be re-issued for a user who already consented.
    pub fn authorization_url(cfg: &GoogleResolvedConfig) -> Result<Url, SitepushError> {
        if !cfg.has_client_identity() {
            return Err(SitepushError::Configuration(
                "Google OAuth client id/secret are not configured".to_string(),
            ));
        }

        let mut url = cfg.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &cfg.client_id)
            .append_pair("redirect_uri", cfg.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &cfg.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    /// Exchange an authorization code for tokens. Codes are single-use; never retried.
    pub async fn exchange_authorization_code(
        cfg: &GoogleResolvedConfig,
        code: AuthorizationCode,
        http_client: &reqwest::Client,
    ) -> Result<BasicTokenResponse, OauthError> {
        let client = Self::build_client(cfg, &cfg.client_id, &cfg.client_secret)?;
        let token_result = client.exchange_code(code).request_async(http_client).await?;
        info!("Google OAuth2 code exchange completed successfully");
        Ok(token_result)
    }

    /// Refresh an access token with the credential's own client identity.
    pub async fn refresh_access_token(
        cfg: &GoogleResolvedConfig,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
        http_client: &reqwest::Client,
    ) -> Result<BasicTokenResponse, OauthError> {
        let client = Self::build_client(cfg, client_id, client_secret)?;
        let token_result = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(http_client)
            .await?;
        Ok(token_result)
    }
}
