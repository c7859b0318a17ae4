// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Platform endpoints consumed by the editor front-end.

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{config::PlatformProperties, error::PlatformError, state::AppState};

/// Public view of the platform configuration. Filesystem paths are never
/// exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformInfo {
    pub server_name: String,
    pub platform_uri: String,
    pub explorer_uri: String,
    pub editor_uri: String,
    pub libs_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_browser_editor: Option<String>,
    pub features: FeatureUrls,
}

/// Editor integration URLs; unset ones are omitted.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeatureUrls {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jbpm_gui: Option<String>,
}

impl From<&PlatformProperties> for PlatformInfo {
    fn from(props: &PlatformProperties) -> Self {
        let owned = |value: Option<&str>| value.map(str::to_string);
        Self {
            server_name: props.server_name().to_string(),
            platform_uri: props.platform_uri().to_string(),
            explorer_uri: props.explorer_uri().to_string(),
            editor_uri: props.editor_uri().to_string(),
            libs_uri: props.libs_uri().to_string(),
            supported_browser_editor: owned(props.supported_browser_editor_regexp()),
            features: FeatureUrls {
                step_editor: owned(props.step_editor_url()),
                queue_editor: owned(props.queue_editor_url()),
                action_editor: owned(props.action_editor_url()),
                step_list: owned(props.step_list_url()),
                button_list: owned(props.button_list_url()),
                jbpm_gui: owned(props.jbpm_gui_url()),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrowserSupport {
    pub supported: bool,
}

#[utoipa::path(
    get,
    path = "/p/info",
    tag = "Platform",
    responses((status = 200, description = "Platform configuration", body = PlatformInfo))
)]
pub async fn info(State(state): State<AppState>) -> Json<PlatformInfo> {
    Json(PlatformInfo::from(state.properties.as_ref()))
}

/// Whether the editor supports the caller's browser.
#[utoipa::path(
    get,
    path = "/p/browser-support",
    tag = "Platform",
    responses(
        (status = 200, description = "Browser check result", body = BrowserSupport),
        (status = 400, description = "User-Agent header missing", body = crate::filter::ErrorBody)
    )
)]
pub async fn browser_support(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BrowserSupport>, PlatformError> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            PlatformError::bad_request("MISSING_PARAMETER", ["User-Agent"])
        })?;

    Ok(Json(BrowserSupport {
        supported: state.properties.is_supported_browser(user_agent),
    }))
}
