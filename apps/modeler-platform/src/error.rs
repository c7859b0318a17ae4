// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error types.
//!
//! [`PlatformError`] is what request handlers fail with. It is a tagged union
//! over the three failure classes the error filter distinguishes, plus an
//! owned cause chain. [`InitializationError`] covers fatal startup failures.

use std::borrow::Cow;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::properties::PropertiesError;

/// Text some lower layers prepend to request error messages.
pub const INTERNAL_MESSAGE_PREFIX: &str = "RequestException Error Code: ";

/// Upper bound when converting foreign `source()` chains.
const MAX_SOURCE_CHAIN: usize = 256;

/// Failure class of a [`PlatformError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected application failure with an explicit HTTP status and an
    /// optional localizable error code.
    Request {
        status: StatusCode,
        code: Option<String>,
        params: Vec<String>,
    },
    /// Authorization failure.
    Security,
    /// Anything else.
    Unclassified,
}

#[derive(Debug, Clone)]
pub struct PlatformError {
    kind: ErrorKind,
    type_name: Cow<'static, str>,
    message: String,
    cause: Option<Box<PlatformError>>,
}

impl PlatformError {
    pub fn request(status: StatusCode) -> Self {
        Self {
            kind: ErrorKind::Request {
                status,
                code: None,
                params: Vec::new(),
            },
            type_name: Cow::Borrowed("RequestError"),
            message: format!("request failed with status {}", status.as_u16()),
            cause: None,
        }
    }

    pub fn not_found<I, S>(code: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::request(StatusCode::NOT_FOUND).with_code(code, params)
    }

    pub fn bad_request<I, S>(code: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::request(StatusCode::BAD_REQUEST).with_code(code, params)
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Security,
            type_name: Cow::Borrowed("SecurityError"),
            message: message.into(),
            cause: None,
        }
    }

    pub fn unclassified(
        type_name: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Unclassified,
            type_name: type_name.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Convert any error, keeping its `source()` chain as causes. Nested
    /// `PlatformError`s in the chain keep their classification.
    pub fn from_error<E: std::error::Error + 'static>(err: &E) -> Self {
        let head = Self::unclassified(simple_type_name::<E>(), err.to_string());
        match err.source() {
            Some(source) => head.caused_by(Self::from_source(source)),
            None => head,
        }
    }

    fn from_source(source: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut next = Some(source);
        while let Some(err) = next.take() {
            if chain.len() == MAX_SOURCE_CHAIN {
                break;
            }
            if let Some(platform) = err.downcast_ref::<PlatformError>() {
                chain.push(platform.clone());
                break;
            }
            chain.push(Self::unclassified(source_type_name(err), err.to_string()));
            next = err.source();
        }

        let mut iter = chain.into_iter().rev();
        let innermost = iter
            .next()
            .unwrap_or_else(|| Self::unclassified("Error", String::new()));
        iter.fold(innermost, |inner, outer| outer.caused_by(inner))
    }

    /// Attach a structured error code and its positional parameters.
    /// No effect on errors that are not request errors.
    pub fn with_code<I, S>(mut self, code: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ErrorKind::Request {
            code: slot,
            params: slot_params,
            ..
        } = &mut self.kind
        {
            let code = code.into();
            self.message = format!("{INTERNAL_MESSAGE_PREFIX}{code}");
            *slot = Some(code);
            *slot_params = params.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<Cow<'static, str>>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Replace the cause of this error.
    pub fn caused_by(mut self, cause: PlatformError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&PlatformError> {
        self.cause.as_deref()
    }

    /// This error followed by each of its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &PlatformError> {
        std::iter::successors(Some(self), |err| err.cause())
    }

    /// Carried HTTP status of a request error.
    pub fn request_status(&self) -> Option<StatusCode> {
        match &self.kind {
            ErrorKind::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_security(&self) -> bool {
        matches!(self.kind, ErrorKind::Security)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        Self::from_error(&err).with_type_name("IoError")
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        Self::from_error(&err).with_type_name("JsonError")
    }
}

/// Handlers return the error itself; the error filter finds it in the
/// response extensions and renders the real body.
impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self
            .request_status()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Readable name for a type-erased `source()` link.
fn source_type_name(err: &(dyn std::error::Error + 'static)) -> &'static str {
    if err.is::<std::io::Error>() {
        "IoError"
    } else if err.is::<serde_json::Error>() {
        "JsonError"
    } else if err.is::<regex::Error>() {
        "RegexError"
    } else if err.is::<tera::Error>() {
        "TemplateError"
    } else if err.is::<PropertiesError>() {
        "PropertiesError"
    } else {
        "Error"
    }
}

/// Last path segment of a type name, without generic arguments.
fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("failed to read platform properties from {path}")]
    ReadProperties {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed platform properties")]
    Properties(#[from] PropertiesError),

    #[error("invalid supported browser pattern `{pattern}`")]
    InvalidBrowserPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed message catalog")]
    Catalog(#[source] PropertiesError),

    #[error("failed to compile error view")]
    View(#[from] tera::Error),

    #[error("invalid bind address `{0}`")]
    BindAddress(String),
}
