use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::google::UrlNotificationMetadata;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestIndexingRequest {
    pub urls: Vec<String>,
}

/// Outcome of one URL inside a batch. Exactly one of `error` / `result` is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UrlSubmissionResult {
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl UrlSubmissionResult {
    pub fn succeeded(url: impl Into<String>, result: Value) -> Self {
        Self {
            url: url.into(),
            success: true,
            error: None,
            result: Some(result),
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            error: Some(error.into()),
            result: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub success_count: usize,
    pub error_count: usize,
    pub total: usize,
    pub results: Vec<UrlSubmissionResult>,
}

impl BatchResult {
    pub fn push(&mut self, outcome: UrlSubmissionResult) {
        if outcome.success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
        self.total += 1;
        self.results.push(outcome);
    }

    pub fn is_complete_success(&self) -> bool {
        self.error_count == 0
    }

    pub fn is_partial(&self) -> bool {
        self.success_count > 0 && self.error_count > 0
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub batch: BatchResult,
}

/// Reference to a piece of published content, as sent by the CMS.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentRef {
    pub url: String,
    #[serde(rename = "type", default = "default_page_type")]
    pub page_type: String,
    #[serde(default)]
    pub reference_id: Option<String>,
}

fn default_page_type() -> String {
    "page".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoSubmitResponse {
    pub success: bool,
    pub message: String,
    pub url: String,
    #[serde(default)]
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapSubmitResponse {
    pub success: bool,
    pub message: String,
    pub sitemap_url: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingEntryView {
    pub url: String,
    pub page_type: String,
    pub reference_id: Option<String>,
    pub indexing_status: String,
    pub last_checked: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingEntriesResponse {
    pub entries: Vec<IndexingEntryView>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackUrlResponse {
    pub success: bool,
    pub entry: IndexingEntryView,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckUrlRequest {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckUrlResponse {
    pub success: bool,
    pub url: String,
    pub metadata: UrlNotificationMetadata,
}
