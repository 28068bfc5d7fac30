use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential view without secrets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub client_id: String,
    pub property_url: Option<String>,
    pub auto_submit_on_publish: bool,
    pub auto_submit_sitemap: bool,
    pub token_expires_at: DateTime<Utc>,
    pub last_sitemap_submit: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub connected: bool,
    pub settings: Option<SettingsView>,
}

/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatchRequest {
    #[serde(default)]
    pub property_url: Option<String>,
    #[serde(default)]
    pub auto_submit_on_publish: Option<bool>,
    #[serde(default)]
    pub auto_submit_sitemap: Option<bool>,
}

impl SettingsPatchRequest {
    pub fn is_empty(&self) -> bool {
        self.property_url.is_none()
            && self.auto_submit_on_publish.is_none()
            && self.auto_submit_sitemap.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsPatchResponse {
    pub success: bool,
    pub settings: SettingsView,
}
