// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr};

use modeler_platform::{
    api::router,
    config::{
        PlatformProperties, CONTEXT_PATH_ENV, HOST_ENV, PLATFORM_PROPERTIES_ENV, PORT_ENV,
        SUPPORTED_BROWSER_EDITOR_ENV,
    },
    error::InitializationError,
    filter::ErrorFilter,
    logging::{self, LogFormat, LOG_FORMAT_ENV},
    settings::EnvSettings,
    state::AppState,
};

#[tokio::main]
async fn main() {
    logging::init(LogFormat::parse(env::var(LOG_FORMAT_ENV).ok().as_deref()));

    // Configuration and catalog must load before serving; failure aborts startup.
    let (state, addr) = match initialize() {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!(error = ?e, "Startup failed");
            std::process::exit(1);
        }
    };

    tracing::info!(
        server_name = state.properties.server_name(),
        platform_uri = state.properties.platform_uri(),
        root_directory = state.properties.root_directory_path(),
        "Platform properties loaded"
    );

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!("Modeler platform listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn initialize() -> Result<(AppState, SocketAddr), InitializationError> {
    let context_path = context_path(env::var(CONTEXT_PATH_ENV).ok().as_deref());
    let browser_pattern = env::var(SUPPORTED_BROWSER_EDITOR_ENV).ok();

    let properties = match env::var(PLATFORM_PROPERTIES_ENV) {
        Ok(path) => PlatformProperties::load_from_path(
            &context_path,
            browser_pattern.as_deref(),
            &path,
            &EnvSettings,
        )?,
        Err(_) => PlatformProperties::load_bundled(
            &context_path,
            browser_pattern.as_deref(),
            &EnvSettings,
        )?,
    };
    let errors = ErrorFilter::init()?;

    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var(PORT_ENV).unwrap_or_else(|_| "8080".to_string());
    let bind = format!("{host}:{port}");
    let addr: SocketAddr = bind
        .parse()
        .map_err(|_| InitializationError::BindAddress(bind.clone()))?;

    Ok((AppState::new(properties, errors), addr))
}

/// Servlet-style context path: empty, or `/name` without a trailing slash.
fn context_path(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or_default().trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
