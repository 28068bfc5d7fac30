use crate::config::GoogleResolvedConfig;
use crate::error::{IsRetryable, OauthError, SitepushError, body_preview};
use backon::{ExponentialBuilder, Retryable};
use serde_json::{Map, Value};
use sitepush_schema::{UrlNotification, UrlNotificationMetadata};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Backoff for idempotent reads. Publishes, sitemap pushes and token grants are never retried.
pub static METADATA_RETRY_POLICY: LazyLock<ExponentialBuilder> = LazyLock::new(|| {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(3)
        .with_jitter()
});

/// Stateless calls against the Indexing and Search Console APIs.
pub struct SearchConsoleOps;

impl SearchConsoleOps {
    pub fn publish_endpoint(cfg: &GoogleResolvedConfig) -> String {
        format!(
            "{}/v3/urlNotifications:publish",
            trim_base(&cfg.indexing_api_url)
        )
    }

    pub fn metadata_endpoint(cfg: &GoogleResolvedConfig) -> String {
        format!(
            "{}/v3/urlNotifications/metadata",
            trim_base(&cfg.indexing_api_url)
        )
    }

    /// `PUT` target for a sitemap; both URLs are encoded as single path segments.
    pub fn sitemap_endpoint(
        cfg: &GoogleResolvedConfig,
        property_url: &str,
        sitemap_url: &str,
    ) -> String {
        format!(
            "{}/webmasters/v3/sites/{}/sitemaps/{}",
            trim_base(&cfg.webmasters_api_url),
            encode_segment(property_url),
            encode_segment(sitemap_url)
        )
    }

    /// Notify Google that `url` was added or updated. Returns the upstream JSON body.
    pub async fn publish_url_updated(
        cfg: &GoogleResolvedConfig,
        access_token: &str,
        url: &str,
        http_client: &reqwest::Client,
    ) -> Result<Value, SitepushError> {
        let resp = http_client
            .post(Self::publish_endpoint(cfg))
            .bearer_auth(access_token)
            .json(&UrlNotification::updated(url))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(upstream_status(status, &body));
        }
        debug!(url, "URL_UPDATED notification accepted");

        Ok(accepted_body(body))
    }

    pub async fn submit_sitemap(
        cfg: &GoogleResolvedConfig,
        access_token: &str,
        property_url: &str,
        sitemap_url: &str,
        http_client: &reqwest::Client,
    ) -> Result<(), SitepushError> {
        let resp = http_client
            .put(Self::sitemap_endpoint(cfg, property_url, sitemap_url))
            .bearer_auth(access_token)
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(upstream_status(status, &body));
        }
        Ok(())
    }

    pub async fn url_notification_metadata(
        cfg: &GoogleResolvedConfig,
        access_token: &str,
        url: &str,
        http_client: &reqwest::Client,
    ) -> Result<UrlNotificationMetadata, SitepushError> {
        let resp = http_client
            .get(Self::metadata_endpoint(cfg))
            .query(&[("url", url)])
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(upstream_status(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Metadata lookup with network-aware retries.
    pub async fn url_notification_metadata_with_retry(
        cfg: &GoogleResolvedConfig,
        access_token: &str,
        url: &str,
        http_client: &reqwest::Client,
    ) -> Result<UrlNotificationMetadata, SitepushError> {
        let retry_policy = METADATA_RETRY_POLICY.clone();

        (|| async { Self::url_notification_metadata(cfg, access_token, url, http_client).await })
            .retry(retry_policy)
            .when(|e: &SitepushError| e.is_retryable())
            .notify(|err, dur: Duration| {
                warn!(
                    "urlNotifications/metadata retrying after error {}, sleeping {:?}",
                    err, dur
                );
            })
            .await
    }
}

fn trim_base(base: &Url) -> &str {
    base.as_str().trim_end_matches('/')
}

/// Body of a 2xx publish. The notification is already accepted, so a body that is not
/// JSON is kept as text instead of failing the call.
fn accepted_body(body: String) -> Value {
    if body.trim().is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

fn upstream_status(status: reqwest::StatusCode, body: &str) -> SitepushError {
    OauthError::UpstreamStatus {
        status,
        body: body_preview(body),
    }
    .into()
}
