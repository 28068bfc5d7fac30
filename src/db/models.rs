use chrono::{DateTime, Utc};
use sitepush_schema::{IndexingEntryView, SettingsView};
use sqlx::FromRow;
use std::fmt;

#[derive(Clone, PartialEq, FromRow)]
pub struct DbCredential {
    pub id: i64,
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: DateTime<Utc>,
    pub property_url: Option<String>,
    pub auto_submit_on_publish: bool,
    pub auto_submit_sitemap: bool,
    pub last_sitemap_submit: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbCredential {
    pub fn to_view(&self) -> SettingsView {
        SettingsView {
            client_id: self.client_id.clone(),
            property_url: self.property_url.clone(),
            auto_submit_on_publish: self.auto_submit_on_publish,
            auto_submit_sitemap: self.auto_submit_sitemap,
            token_expires_at: self.token_expires_at,
            last_sitemap_submit: self.last_sitemap_submit,
            is_active: self.is_active,
        }
    }
}

impl fmt::Debug for DbCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredential")
            .field("id", &self.id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_expires_at", &self.token_expires_at)
            .field("property_url", &self.property_url)
            .field("auto_submit_on_publish", &self.auto_submit_on_publish)
            .field("auto_submit_sitemap", &self.auto_submit_sitemap)
            .field("last_sitemap_submit", &self.last_sitemap_submit)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbIndexingStatus {
    pub id: i64,
    pub url: String,
    pub page_type: String,
    pub reference_id: Option<String>,
    pub indexing_status: String,
    pub last_checked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbIndexingStatus {
    pub fn state(&self) -> IndexingState {
        IndexingState::from(self.indexing_status.as_str())
    }

    pub fn to_view(&self) -> IndexingEntryView {
        IndexingEntryView {
            url: self.url.clone(),
            page_type: self.page_type.clone(),
            reference_id: self.reference_id.clone(),
            indexing_status: self.indexing_status.clone(),
            last_checked: self.last_checked,
        }
    }
}

/// Indexing lifecycle of a tracked URL.
///
/// This crate only moves entries `Pending -> Submitted`. `Reported` carries states written by
/// an external status poller (e.g. `INDEXED`) and is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingState {
    Pending,
    Submitted,
    Reported(String),
}

impl IndexingState {
    pub fn as_str(&self) -> &str {
        match self {
            IndexingState::Pending => "PENDING",
            IndexingState::Submitted => "SUBMITTED",
            IndexingState::Reported(s) => s.as_str(),
        }
    }
}

impl From<&str> for IndexingState {
    fn from(value: &str) -> Self {
        match value {
            "PENDING" => IndexingState::Pending,
            "SUBMITTED" => IndexingState::Submitted,
            other => IndexingState::Reported(other.to_string()),
        }
    }
}

impl fmt::Display for IndexingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
