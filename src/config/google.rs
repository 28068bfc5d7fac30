use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Scopes requested at consent: site verification/management plus page indexing.
pub const GOOGLE_OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/webmasters",
    "https://www.googleapis.com/auth/indexing",
];

/// Google OAuth + Search Console configuration managed by Figment.
///
/// Notes:
/// - `redirect_uri` is a deployment constant. It is sent verbatim at consent and at code
///   exchange and is never derived from an incoming request.
/// - API base URLs are configurable so tests can point them at local mock servers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    /// OAuth client id. TOML: `google.client_id`. Env: `SITEPUSH_GOOGLE__CLIENT_ID`.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret. TOML: `google.client_secret`. Env: `SITEPUSH_GOOGLE__CLIENT_SECRET`.
    #[serde(default)]
    pub client_secret: String,

    /// Fixed callback endpoint registered with the OAuth client.
    /// TOML: `google.redirect_uri`. Default: `http://localhost:8188/admin/google-callback`.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: Url,

    /// TOML: `google.auth_url`. Default: `https://accounts.google.com/o/oauth2/v2/auth`.
    #[serde(default = "default_auth_url")]
    pub auth_url: Url,

    /// TOML: `google.token_url`. Default: `https://oauth2.googleapis.com/token`.
    #[serde(default = "default_token_url")]
    pub token_url: Url,

    /// Base URL of the Indexing API. TOML: `google.indexing_api_url`.
    /// Default: `https://indexing.googleapis.com`.
    #[serde(default = "default_indexing_api_url")]
    pub indexing_api_url: Url,

    /// Base URL of the Search Console (webmasters) API. TOML: `google.webmasters_api_url`.
    /// Default: `https://www.googleapis.com`.
    #[serde(default = "default_webmasters_api_url")]
    pub webmasters_api_url: Url,

    /// Sitemap pushed by the sitemap submission. Falls back to `{property_url}/sitemap.xml`.
    /// TOML: `google.sitemap_url`.
    #[serde(default)]
    pub sitemap_url: Option<Url>,

    /// Optional upstream HTTP proxy. TOML: `google.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Per-request timeout for upstream calls, in seconds.
    /// TOML: `google.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Immutable view injected into every Google-facing component.
#[derive(Debug, Clone)]
pub struct GoogleResolvedConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub indexing_api_url: Url,
    pub webmasters_api_url: Url,
    pub sitemap_url: Option<Url>,
    pub proxy: Option<Url>,
    pub request_timeout: Duration,
    pub scopes: Vec<String>,
}

impl GoogleConfig {
    pub fn resolve(&self) -> GoogleResolvedConfig {
        GoogleResolvedConfig {
            client_id: self.client_id.trim().to_string(),
            client_secret: self.client_secret.trim().to_string(),
            redirect_uri: self.redirect_uri.clone(),
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
            indexing_api_url: self.indexing_api_url.clone(),
            webmasters_api_url: self.webmasters_api_url.clone(),
            sitemap_url: self.sitemap_url.clone(),
            proxy: self.proxy.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            scopes: GOOGLE_OAUTH_SCOPES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl GoogleResolvedConfig {
    pub fn has_client_identity(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            indexing_api_url: default_indexing_api_url(),
            webmasters_api_url: default_webmasters_api_url(),
            sitemap_url: None,
            proxy: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_redirect_uri() -> Url {
    Url::parse("http://localhost:8188/admin/google-callback")
        .expect("default redirect_uri must be a valid URL")
}

fn default_auth_url() -> Url {
    Url::parse("https://accounts.google.com/o/oauth2/v2/auth")
        .expect("default auth_url must be a valid URL")
}

fn default_token_url() -> Url {
    Url::parse("https://oauth2.googleapis.com/token")
        .expect("default token_url must be a valid URL")
}

fn default_indexing_api_url() -> Url {
    Url::parse("https://indexing.googleapis.com")
        .expect("default indexing_api_url must be a valid URL")
}

fn default_webmasters_api_url() -> Url {
    Url::parse("https://www.googleapis.com").expect("default webmasters_api_url must be a valid URL")
}

fn default_request_timeout_secs() -> u64 {
    30
}
