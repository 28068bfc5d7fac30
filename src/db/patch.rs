use chrono::{DateTime, Utc};

use super::models::IndexingState;

/// Token pair minted by an `authorization_code` exchange, plus the client identity used.
#[derive(Clone)]
pub struct AuthorizationGrant {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthorizationGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGrant")
            .field("client_id", &self.client_id)
            .field("token_expires_at", &self.token_expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialPatch {
    /// `None` => do not change; `Some(v)` => update
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    /// `None` => do not change; `Some(v)` => update
    pub property_url: Option<String>,
    pub auto_submit_on_publish: Option<bool>,
    pub auto_submit_sitemap: Option<bool>,
    pub last_sitemap_submit: Option<DateTime<Utc>>,
}

/// Upsert of a `seo_indexing_status` row keyed by `url`.
///
/// On conflict, `page_type`/`reference_id`/`last_checked` are only overwritten when set, and a
/// `Pending` status never replaces the stored one.
#[derive(Debug, Clone)]
pub struct IndexingStatusUpsert {
    pub url: String,
    pub page_type: Option<String>,
    pub reference_id: Option<String>,
    pub status: IndexingState,
    pub last_checked: Option<DateTime<Utc>>,
}

impl IndexingStatusUpsert {
    pub fn submitted(url: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            page_type: None,
            reference_id: None,
            status: IndexingState::Submitted,
            last_checked: Some(at),
        }
    }

    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_type: None,
            reference_id: None,
            status: IndexingState::Pending,
            last_checked: None,
        }
    }

    pub fn with_content(mut self, page_type: Option<String>, reference_id: Option<String>) -> Self {
        self.page_type = page_type;
        self.reference_id = reference_id;
        self
    }
}
