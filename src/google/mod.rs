//! Google OAuth credential lifecycle and Search Console submissions.
//!
//! Layout:
//! - `oauth`: token endpoint exchanges and the consent URL
//! - `token`: just-in-time access token refresh against the stored credential
//! - `flow`: consent URL + callback handling that persists the credential
//! - `console`: stateless Indexing / Search Console API calls
//! - `submission`: batch, auto-submit and sitemap pipelines

pub mod console;
pub mod flow;
pub mod oauth;
pub mod submission;
pub mod token;

pub use console::SearchConsoleOps;
pub use flow::OauthFlow;
pub use oauth::endpoints::GoogleOauthEndpoints;
pub use submission::SubmissionPipeline;
pub use token::TokenRefresher;

use crate::config::GoogleResolvedConfig;
use crate::error::SitepushError;
use std::time::Duration;

pub const SITEPUSH_USER_AGENT: &str = concat!("sitepush/", env!("CARGO_PKG_VERSION"));

/// Build the shared upstream client. Redirects are never followed.
pub fn build_http_client(cfg: &GoogleResolvedConfig) -> Result<reqwest::Client, SitepushError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(SITEPUSH_USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(cfg.request_timeout);

    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    Ok(builder.build()?)
}
