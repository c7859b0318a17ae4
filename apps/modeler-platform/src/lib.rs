// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Modeler Platform - configuration and error translation
//!
//! Startup configuration for the process-modeling web platform and the HTTP
//! filter that turns handler failures into localized error responses.
//!
//! ## Modules
//!
//! - `config` - Platform properties loaded once at startup
//! - `catalog` - Error-code message catalog and template formatting
//! - `error` - Request, security and unclassified error taxonomy
//! - `filter` - Error-translation middleware (JSON or HTML)
//! - `api` - HTTP API handlers (Axum)

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod properties;
pub mod settings;
pub mod state;
pub mod view;
