mod indexing;
mod oauth;
mod settings;

pub use indexing::{
    AutoSubmitResponse, BatchResponse, BatchResult, CheckUrlRequest, CheckUrlResponse, ContentRef,
    IndexingEntriesResponse, IndexingEntryView, RequestIndexingRequest, SitemapSubmitResponse,
    TrackUrlResponse, UrlSubmissionResult,
};
pub use oauth::{AuthUrlResponse, OauthCallbackRequest, RefreshTokenResponse};
pub use settings::{
    SettingsPatchRequest, SettingsPatchResponse, SettingsResponse, SettingsView,
};

use serde::{Deserialize, Serialize};

/// Error payload shared by every endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: Self = Self { success: true };
}
