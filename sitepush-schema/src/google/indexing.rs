use serde::{Deserialize, Serialize};

/// Body of `urlNotifications:publish`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UrlNotification {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
}

impl UrlNotification {
    pub fn updated(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: NotificationType::UrlUpdated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    UrlUpdated,
    UrlDeleted,
}

/// Response of `urlNotifications/metadata`, also nested in publish responses.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotificationMetadata {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_update: Option<UrlNotificationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_remove: Option<UrlNotificationEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotificationEntry {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<NotificationType>,
    /// RFC3339 timestamp as reported upstream.
    #[serde(default)]
    pub notify_time: Option<String>,
}
