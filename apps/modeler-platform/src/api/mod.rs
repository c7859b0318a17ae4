// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::Uri,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::PlatformError,
    filter::{panic_to_error, translate_errors, ErrorBody, ErrorFilter},
    state::AppState,
};

pub mod health;
pub mod platform;

pub fn router(state: AppState) -> Router {
    let platform_uri = state.properties.platform_uri().to_string();
    let errors = state.errors.clone();

    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route(&format!("{platform_uri}/info"), get(platform::info))
        .route(
            &format!("{platform_uri}/browser-support"),
            get(platform::browser_support),
        )
        .fallback(not_found)
        .with_state(state);

    let app = Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    with_error_handling(app, errors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Wrap a router so handler errors and panics are translated by `errors`.
pub fn with_error_handling(router: Router, errors: ErrorFilter) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_to_error))
        .layer(from_fn_with_state(errors, translate_errors))
}

async fn not_found(uri: Uri) -> PlatformError {
    PlatformError::not_found("NOT_FOUND", [uri.path()])
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        platform::info,
        platform::browser_support
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            platform::PlatformInfo,
            platform::FeatureUrls,
            platform::BrowserSupport,
            ErrorBody
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Platform", description = "Platform configuration for the editor")
    )
)]
struct ApiDoc;
