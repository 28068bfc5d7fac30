pub mod api;
pub mod google;

pub use api::{
    AuthUrlResponse, AutoSubmitResponse, BatchResponse, BatchResult, CheckUrlRequest,
    CheckUrlResponse, ContentRef, ErrorResponse, IndexingEntriesResponse, IndexingEntryView,
    OauthCallbackRequest, RefreshTokenResponse, RequestIndexingRequest, SettingsPatchRequest,
    SettingsPatchResponse, SettingsResponse, SettingsView, SitemapSubmitResponse,
    SuccessResponse, TrackUrlResponse, UrlSubmissionResult,
};
pub use google::{
    NotificationType, UrlNotification, UrlNotificationEntry, UrlNotificationMetadata,
};
