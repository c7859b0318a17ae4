// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::PlatformProperties;
use crate::filter::ErrorFilter;

/// Process-wide, read-only state built at startup and shared with handlers.
#[derive(Clone)]
pub struct AppState {
    pub properties: Arc<PlatformProperties>,
    pub errors: ErrorFilter,
}

impl AppState {
    pub fn new(properties: PlatformProperties, errors: ErrorFilter) -> Self {
        Self {
            properties: Arc::new(properties),
            errors,
        }
    }
}
