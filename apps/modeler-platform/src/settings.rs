// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deployment settings lookup.
//!
//! The configuration loader never reads the process environment directly; it
//! asks a [`SettingsLookup`]. Production wires in [`EnvSettings`], tests pass a
//! plain `HashMap`.

use std::collections::HashMap;

/// Named settings provided by the deployment environment.
pub trait SettingsLookup {
    /// Value of the named setting, `None` when unset.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads settings from process environment variables.
///
/// Dotted setting names are mapped to conventional variable names:
/// `app.workflow.home` is read from `APP_WORKFLOW_HOME`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl EnvSettings {
    pub fn variable_name(name: &str) -> String {
        name.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl SettingsLookup for EnvSettings {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(Self::variable_name(name)).ok()
    }
}

impl SettingsLookup for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl<T: SettingsLookup + ?Sized> SettingsLookup for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}
