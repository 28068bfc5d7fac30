use super::console::SearchConsoleOps;
use super::token::TokenRefresher;
use crate::config::GoogleResolvedConfig;
use crate::db::{CredentialPatch, DbActorHandle, DbIndexingStatus, IndexingStatusUpsert};
use crate::error::SitepushError;
use crate::events::{EventSink, SitepushEvent};
use chrono::Utc;
use serde_json::Value;
use sitepush_schema::{
    AutoSubmitResponse, BatchResult, ContentRef, SitemapSubmitResponse, UrlNotificationMetadata,
    UrlSubmissionResult,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const AUTO_SUBMIT_DISABLED: &str = "Auto-submit is disabled";
const SITEMAP_SUBMIT_DISABLED: &str = "Sitemap auto-submit is disabled";

/// Pushes URLs and sitemaps to Google and records per-URL outcomes.
#[derive(Clone)]
pub struct SubmissionPipeline {
    cfg: Arc<GoogleResolvedConfig>,
    db: DbActorHandle,
    http: reqwest::Client,
    events: EventSink,
    tokens: TokenRefresher,
}

impl SubmissionPipeline {
    pub fn new(
        cfg: Arc<GoogleResolvedConfig>,
        db: DbActorHandle,
        http: reqwest::Client,
        events: EventSink,
    ) -> Self {
        let tokens = TokenRefresher::new(cfg.clone(), db.clone(), http.clone(), events.clone());
        Self {
            cfg,
            db,
            http,
            events,
            tokens,
        }
    }

    /// Submit a batch of URLs, one at a time, with a single token for the whole batch.
    ///
    /// Per-URL failures are recorded in the result and never abort the batch.
    pub async fn submit_urls(&self, urls: Vec<String>) -> Result<BatchResult, SitepushError> {
        if urls.is_empty() {
            return Err(SitepushError::InvalidRequest(
                "urls must be a non-empty array".to_string(),
            ));
        }

        // Blank entries fail on their own; no token is needed when nothing can be sent.
        let access_token = if urls.iter().any(|u| !u.trim().is_empty()) {
            Some(self.tokens.ensure_valid_access_token().await?)
        } else {
            None
        };

        let mut batch = BatchResult::default();
        for url in urls {
            let outcome = match access_token.as_deref() {
                Some(token) if !url.trim().is_empty() => {
                    match self.publish_and_record(token, &url, None, None).await {
                        Ok(result) => UrlSubmissionResult::succeeded(url, result),
                        Err(e) => {
                            warn!(url = %url, error = %e, "URL submission failed");
                            UrlSubmissionResult::failed(url, e.to_string())
                        }
                    }
                }
                _ => UrlSubmissionResult::failed(url, "url must be a non-empty string"),
            };
            batch.push(outcome);
        }

        if batch.is_complete_success() {
            info!(total = batch.total, "indexing batch finished");
        } else {
            warn!(
                success_count = batch.success_count,
                error_count = batch.error_count,
                total = batch.total,
                partial = batch.is_partial(),
                "indexing batch finished with failures"
            );
        }
        self.events.notify(SitepushEvent::BatchSubmitted {
            success_count: batch.success_count,
            error_count: batch.error_count,
            total: batch.total,
        });
        Ok(batch)
    }

    /// Submit one freshly published URL when `auto_submit_on_publish` is on.
    pub async fn auto_submit(
        &self,
        content: ContentRef,
    ) -> Result<AutoSubmitResponse, SitepushError> {
        let url = content.url.trim().to_string();
        if url.is_empty() {
            return Err(SitepushError::InvalidRequest("url is required".to_string()));
        }

        let enabled = self
            .db
            .get_active_credential()
            .await?
            .is_some_and(|c| c.auto_submit_on_publish);
        if !enabled {
            debug!(url = %url, "auto-submit skipped");
            self.events.notify(SitepushEvent::AutoSubmitSkipped {
                url: url.clone(),
                reason: AUTO_SUBMIT_DISABLED.to_string(),
            });
            return Ok(AutoSubmitResponse {
                success: true,
                message: AUTO_SUBMIT_DISABLED.to_string(),
                url,
                result: None,
            });
        }

        let access_token = self.tokens.ensure_valid_access_token().await?;
        let result = self
            .publish_and_record(
                &access_token,
                &url,
                Some(content.page_type.clone()),
                content.reference_id.clone(),
            )
            .await
            .map_err(|e| SitepushError::Upstream(e.to_string()))?;

        info!(url = %url, page_type = %content.page_type, "new content submitted for indexing");
        self.events.notify(SitepushEvent::AutoSubmitted {
            url: url.clone(),
            page_type: content.page_type,
            reference_id: content.reference_id,
        });
        Ok(AutoSubmitResponse {
            success: true,
            message: "URL submitted for indexing".to_string(),
            url,
            result: Some(result),
        })
    }

    /// Push the site's sitemap when `auto_submit_sitemap` is on.
    pub async fn submit_sitemap(&self) -> Result<SitemapSubmitResponse, SitepushError> {
        let credential = self.db.get_active_credential().await?.ok_or_else(|| {
            SitepushError::Configuration(
                "Google Search Console is not connected: no active credential".to_string(),
            )
        })?;

        if !credential.auto_submit_sitemap {
            return Ok(SitemapSubmitResponse {
                success: true,
                message: SITEMAP_SUBMIT_DISABLED.to_string(),
                sitemap_url: None,
                submitted_at: None,
            });
        }

        let property_url = credential
            .property_url
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                SitepushError::Configuration("propertyUrl is not configured".to_string())
            })?;
        let sitemap_url = self.sitemap_url_for(property_url)?;

        let access_token = self.tokens.ensure_valid_access_token().await?;
        SearchConsoleOps::submit_sitemap(
            &self.cfg,
            &access_token,
            property_url,
            &sitemap_url,
            &self.http,
        )
        .await
        .map_err(|e| SitepushError::Upstream(e.to_string()))?;

        let submitted_at = Utc::now();
        let patch = CredentialPatch {
            last_sitemap_submit: Some(submitted_at),
            ..Default::default()
        };
        self.db.patch_credential(credential.id, patch).await?;

        info!(sitemap_url = %sitemap_url, "sitemap submitted");
        self.events.notify(SitepushEvent::SitemapSubmitted {
            sitemap_url: sitemap_url.clone(),
            submitted_at,
        });
        Ok(SitemapSubmitResponse {
            success: true,
            message: "Sitemap submitted successfully".to_string(),
            sitemap_url: Some(sitemap_url),
            submitted_at: Some(submitted_at),
        })
    }

    /// Start tracking a URL as `PENDING`. An already submitted entry keeps its status.
    pub async fn track_url(&self, content: ContentRef) -> Result<DbIndexingStatus, SitepushError> {
        let url = content.url.trim();
        if url.is_empty() {
            return Err(SitepushError::InvalidRequest("url is required".to_string()));
        }
        let upsert = IndexingStatusUpsert::pending(url)
            .with_content(Some(content.page_type), content.reference_id);
        self.db.upsert_indexing_status(upsert).await
    }

    /// Ask Google what it last recorded for `url` and stamp `last_checked` on the tracked entry.
    pub async fn inspect_url(&self, url: &str) -> Result<UrlNotificationMetadata, SitepushError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SitepushError::InvalidRequest("url is required".to_string()));
        }

        let access_token = self.tokens.ensure_valid_access_token().await?;
        let metadata = SearchConsoleOps::url_notification_metadata_with_retry(
            &self.cfg,
            &access_token,
            url,
            &self.http,
        )
        .await
        .map_err(|e| SitepushError::Upstream(e.to_string()))?;

        let touched = self.db.touch_indexing_status(url, Utc::now()).await?;
        debug!(url, touched, "indexing metadata checked");
        Ok(metadata)
    }

    fn sitemap_url_for(&self, property_url: &str) -> Result<String, SitepushError> {
        if let Some(configured) = self.cfg.sitemap_url.as_ref() {
            return Ok(configured.to_string());
        }
        if !(property_url.starts_with("http://") || property_url.starts_with("https://")) {
            return Err(SitepushError::Configuration(format!(
                "cannot derive a sitemap URL from property {property_url}; set google.sitemap_url"
            )));
        }
        Ok(format!("{}/sitemap.xml", property_url.trim_end_matches('/')))
    }

    /// Publish `URL_UPDATED` and mark the entry `SUBMITTED`.
    ///
    /// A failed status write after an accepted publish is logged but not reported as a
    /// failure, so callers never resubmit a URL Google already has.
    async fn publish_and_record(
        &self,
        access_token: &str,
        url: &str,
        page_type: Option<String>,
        reference_id: Option<String>,
    ) -> Result<Value, SitepushError> {
        let result =
            SearchConsoleOps::publish_url_updated(&self.cfg, access_token, url, &self.http).await?;

        let upsert =
            IndexingStatusUpsert::submitted(url, Utc::now()).with_content(page_type, reference_id);
        if let Err(e) = self.db.upsert_indexing_status(upsert).await {
            error!(url, error = %e, "failed to record SUBMITTED status");
        }
        Ok(result)
    }
}
