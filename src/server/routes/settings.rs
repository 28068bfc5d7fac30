use crate::db::CredentialPatch;
use crate::error::SitepushError;
use crate::server::router::SitepushState;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, routing::get};
use sitepush_schema::{SettingsPatchRequest, SettingsPatchResponse, SettingsResponse};
use tracing::info;

pub fn router() -> Router<SitepushState> {
    Router::new().route(
        "/google-search-console/settings",
        get(get_settings).patch(patch_settings),
    )
}

/// GET /google-search-console/settings
pub async fn get_settings(
    State(state): State<SitepushState>,
) -> Result<Json<SettingsResponse>, SitepushError> {
    let settings = state
        .db
        .get_active_credential()
        .await?
        .map(|c| c.to_view());
    Ok(Json(SettingsResponse {
        connected: settings.is_some(),
        settings,
    }))
}

/// PATCH /google-search-console/settings
pub async fn patch_settings(
    State(state): State<SitepushState>,
    payload: Result<Json<SettingsPatchRequest>, JsonRejection>,
) -> Result<Json<SettingsPatchResponse>, SitepushError> {
    let Json(request) = payload?;
    if request.is_empty() {
        return Err(SitepushError::InvalidRequest(
            "nothing to update: expected propertyUrl, autoSubmitOnPublish or autoSubmitSitemap"
                .to_string(),
        ));
    }

    let property_url = match request.property_url {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(SitepushError::InvalidRequest(
                    "propertyUrl must not be blank".to_string(),
                ));
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    let credential = state.db.get_active_credential().await?.ok_or_else(|| {
        SitepushError::Configuration(
            "Google Search Console is not connected: no active credential".to_string(),
        )
    })?;

    let patch = CredentialPatch {
        property_url,
        auto_submit_on_publish: request.auto_submit_on_publish,
        auto_submit_sitemap: request.auto_submit_sitemap,
        ..Default::default()
    };
    state.db.patch_credential(credential.id, patch).await?;

    let updated = state.db.get_active_credential().await?.ok_or_else(|| {
        SitepushError::UnexpectedError("active credential vanished during update".to_string())
    })?;
    info!(credential_id = updated.id, "Search Console settings updated");

    Ok(Json(SettingsPatchResponse {
        success: true,
        settings: updated.to_view(),
    }))
}
