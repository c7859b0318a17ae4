// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Error Translation Filter
//!
//! Outermost request middleware. Handlers fail by returning a
//! [`PlatformError`], which rides in the response extensions until this
//! filter picks it up, logs it, and replaces the response with a translated
//! one:
//!
//! - `Accept` containing `application/json` → `{"message": "..."}`
//! - anything else → the server-rendered error page
//!
//! ## Status selection
//!
//! 1. request error (outermost or its direct cause) → its carried status
//! 2. security error (outermost or its direct cause) → 403
//! 3. otherwise → 500
//!
//! ## Message
//!
//! Every error in the cause chain contributes one period-terminated segment,
//! outermost first, separated by a space. Request errors are looked up in
//! the [`MessageCatalog`]; everything else renders as `TypeName: message`
//! with [`INTERNAL_MESSAGE_PREFIX`] removed.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::catalog::{format_template, MessageCatalog};
use crate::error::{ErrorKind, InitializationError, PlatformError, INTERNAL_MESSAGE_PREFIX};
use crate::view::ErrorView;

/// Segments rendered before the rest of a cause chain is summarised.
pub const MAX_CAUSE_DEPTH: usize = 32;

const JSON_MEDIA_TYPE: &str = "application/json";

/// JSON error payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Translated description of the failure and its causes.
    pub message: String,
}

/// Failure while producing the error response itself.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Error Handling Failed: could not encode JSON body")]
    Encoding(#[from] serde_json::Error),

    #[error("Error Handling Failed: could not render error view")]
    Render(#[from] tera::Error),
}

#[derive(Clone)]
pub struct ErrorFilter {
    catalog: Arc<MessageCatalog>,
    view: Arc<ErrorView>,
}

impl ErrorFilter {
    pub fn new(catalog: Arc<MessageCatalog>, view: Arc<ErrorView>) -> Self {
        Self { catalog, view }
    }

    /// Load the bundled catalog and compile the error view.
    pub fn init() -> Result<Self, InitializationError> {
        let catalog = MessageCatalog::bundled()?;
        let view = ErrorView::new()?;
        tracing::info!(messages = catalog.len(), "Loaded error message catalog");
        Ok(Self::new(Arc::new(catalog), Arc::new(view)))
    }

    /// Human-readable description of the whole cause chain.
    pub fn describe(&self, err: &PlatformError) -> String {
        let mut out = String::new();
        let mut chain = err.chain();

        for current in chain.by_ref().take(MAX_CAUSE_DEPTH) {
            if !out.is_empty() {
                out.push(' ');
            }
            self.describe_one(current, &mut out);
            if !out.ends_with('.') {
                out.push('.');
            }
        }

        let omitted = chain.count();
        if omitted > 0 {
            out.push_str(&format!(" ({omitted} further causes omitted)."));
        }
        out
    }

    fn describe_one(&self, err: &PlatformError, out: &mut String) {
        match err.kind() {
            ErrorKind::Request {
                code: Some(code),
                params,
                ..
            } => match self.catalog.template(code) {
                Some(template) => match format_template(template, params.as_slice()) {
                    Ok(message) => out.push_str(&message),
                    Err(e) => {
                        tracing::warn!(
                            code = %code,
                            error = %e,
                            "Error message template could not be formatted"
                        );
                        out.push_str(template);
                    }
                },
                None => out.push_str(&format!(
                    "Unknown error code {code} ({})",
                    err.type_name()
                )),
            },
            ErrorKind::Request { code: None, .. } => {
                out.push_str(&format!("Unknown error code ({})", err.type_name()));
            }
            ErrorKind::Security | ErrorKind::Unclassified => {
                out.push_str(err.type_name());
                out.push_str(": ");
                out.push_str(strip_internal_prefix(err.message()));
            }
        }
    }

    /// Build the translated response.
    pub fn respond(
        &self,
        err: &PlatformError,
        wants_json: bool,
    ) -> Result<Response, TranslationError> {
        let status = status_for(err);
        let message = self.describe(err);

        if wants_json {
            let body = serde_json::to_vec(&ErrorBody { message })?;
            Ok((
                status,
                [(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE))],
                body,
            )
                .into_response())
        } else {
            let page = self.view.render(status, &message)?;
            Ok((status, Html(page)).into_response())
        }
    }
}

/// HTTP status for a failed request.
pub fn status_for(err: &PlatformError) -> StatusCode {
    let direct_cause = err.cause();

    if let Some(status) = err
        .request_status()
        .or_else(|| direct_cause.and_then(PlatformError::request_status))
    {
        return status;
    }

    if err.is_security() || direct_cause.is_some_and(PlatformError::is_security) {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Whether any `Accept` header lists the JSON media type.
pub fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(JSON_MEDIA_TYPE))
}

fn strip_internal_prefix(message: &str) -> &str {
    message
        .strip_prefix(INTERNAL_MESSAGE_PREFIX)
        .unwrap_or(message)
}

/// `A: a <- B: b <- C: c` for the log line. Unlike [`ErrorFilter::describe`]
/// the whole chain is kept.
fn chain_summary(err: &PlatformError) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" <- ")
}

/// Middleware that translates [`PlatformError`] responses.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/p/info", get(info))
///     .layer(axum::middleware::from_fn_with_state(filter, translate_errors));
/// ```
pub async fn translate_errors(
    State(filter): State<ErrorFilter>,
    request: Request,
    next: Next,
) -> Response {
    let wants_json = accepts_json(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let Some(error) = response.extensions_mut().remove::<PlatformError>() else {
        return response;
    };

    let status = status_for(&error);
    tracing::error!(
        %method,
        %path,
        status = status.as_u16(),
        causes = error.chain().count() - 1,
        error = %chain_summary(&error),
        "Request failed"
    );

    match filter.respond(&error, wants_json) {
        Ok(translated) => translated,
        Err(e) => {
            tracing::error!(error = %e, original = %error, "Error handling failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer`. The panic
/// becomes an unclassified error so it is translated like any other failure.
pub fn panic_to_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    PlatformError::unclassified("Panic", message).into_response()
}
