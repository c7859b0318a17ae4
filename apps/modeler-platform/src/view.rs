// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server-rendered error page.

use axum::http::StatusCode;
use tera::{Context, Tera};

use crate::error::InitializationError;

const ERROR_TEMPLATE_NAME: &str = "error.html";
const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

/// The fixed error view. Compiled once at startup; `.html` templates are
/// auto-escaped by tera.
pub struct ErrorView {
    tera: Tera,
}

impl ErrorView {
    pub fn new() -> Result<Self, InitializationError> {
        Self::from_template(ERROR_TEMPLATE)
    }

    /// Compile a replacement page. The template sees the same variables as
    /// the bundled one.
    pub fn from_template(template: &str) -> Result<Self, InitializationError> {
        let mut tera = Tera::default();
        tera.add_raw_template(ERROR_TEMPLATE_NAME, template)?;
        Ok(Self { tera })
    }

    /// Render the page with the `message` and `status` variables.
    pub fn render(&self, status: StatusCode, message: &str) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("message", message);
        ctx.insert("status", &status.as_u16());
        self.tera.render(ERROR_TEMPLATE_NAME, &ctx)
    }
}
