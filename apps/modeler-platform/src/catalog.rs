// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Localized error-code messages.
//!
//! The catalog is compiled into the binary from
//! `resources/error-codes.properties` and parsed once at startup.
//! Templates use printf-style positional placeholders:
//!
//! - `%s` takes the next parameter
//! - `%2$s` takes the second parameter (1-based)
//! - `%%` is a literal percent sign

use std::collections::HashMap;

use thiserror::Error;

use crate::error::InitializationError;
use crate::properties::Properties;

const BUNDLED_CATALOG: &str = include_str!("../resources/error-codes.properties");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("template references parameter {index} but only {available} given")]
    MissingParameter { index: usize, available: usize },

    #[error("invalid parameter index at byte {position}")]
    InvalidIndex { position: usize },

    #[error("unsupported conversion `%{conversion}` at byte {position}")]
    UnsupportedConversion { conversion: char, position: usize },

    #[error("dangling `%` at end of template")]
    Dangling,
}

#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    /// Parse the catalog shipped with the binary.
    pub fn bundled() -> Result<Self, InitializationError> {
        Self::parse(BUNDLED_CATALOG)
    }

    pub fn parse(text: &str) -> Result<Self, InitializationError> {
        let props = Properties::parse(text).map_err(InitializationError::Catalog)?;
        Ok(Self {
            messages: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }

    pub fn template(&self, code: &str) -> Option<&str> {
        self.messages.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl FromIterator<(String, String)> for MessageCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

/// Substitute positional parameters into a template.
pub fn format_template<S: AsRef<str>>(
    template: &str,
    params: &[S],
) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut next_param = 0usize;
    let mut rest = template;
    let mut offset = 0usize;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let spec_start = offset + pos;
        let after = &rest[pos + 1..];

        let digits = after.chars().take_while(char::is_ascii_digit).count();
        let (index, consumed) = if digits > 0 && after[digits..].starts_with('$') {
            let index: usize = after[..digits]
                .parse()
                .ok()
                .filter(|i| *i > 0)
                .ok_or(FormatError::InvalidIndex {
                    position: spec_start,
                })?;
            (Some(index - 1), digits + 1)
        } else {
            (None, 0)
        };

        let conversion = after[consumed..].chars().next().ok_or(FormatError::Dangling)?;
        match conversion {
            '%' if index.is_none() => out.push('%'),
            's' => {
                let index = index.unwrap_or_else(|| {
                    next_param += 1;
                    next_param - 1
                });
                let value = params.get(index).ok_or(FormatError::MissingParameter {
                    index: index + 1,
                    available: params.len(),
                })?;
                out.push_str(value.as_ref());
            }
            other => {
                return Err(FormatError::UnsupportedConversion {
                    conversion: other,
                    position: spec_start,
                })
            }
        }

        let advance = pos + 1 + consumed + conversion.len_utf8();
        rest = &rest[advance..];
        offset += advance;
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_loads() {
        let catalog = MessageCatalog::bundled().unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.template("ITEM_NOT_FOUND"), Some("Item %s not found"));
        assert!(catalog.template("NOT_FOUND").is_some());
    }

    #[test]
    fn formats_sequential_placeholders() {
        assert_eq!(
            format_template("Item %s not found", &["42"]).unwrap(),
            "Item 42 not found"
        );
        assert_eq!(
            format_template("%s moved to %s", &["a", "b"]).unwrap(),
            "a moved to b"
        );
    }

    #[test]
    fn formats_indexed_placeholders_and_percent() {
        assert_eq!(
            format_template("%2$s before %1$s (100%%)", &["x", "y"]).unwrap(),
            "y before x (100%)"
        );
    }

    #[test]
    fn template_without_placeholders_ignores_params() {
        assert_eq!(format_template("plain", &["unused"]).unwrap(), "plain");
        assert_eq!(format_template::<&str>("plain", &[]).unwrap(), "plain");
    }

    #[test]
    fn malformed_templates_fail() {
        assert_eq!(
            format_template::<&str>("Item %s", &[]),
            Err(FormatError::MissingParameter {
                index: 1,
                available: 0
            })
        );
        assert_eq!(
            format_template("%0$s", &["a"]),
            Err(FormatError::InvalidIndex { position: 0 })
        );
        assert_eq!(
            format_template("rate %d", &["1"]),
            Err(FormatError::UnsupportedConversion {
                conversion: 'd',
                position: 5
            })
        );
        assert_eq!(format_template("50%", &["1"]), Err(FormatError::Dangling));
    }

    #[test]
    fn malformed_catalog_is_an_initialization_error() {
        let err = MessageCatalog::parse("bad=\\uZZZZ").unwrap_err();
        assert!(matches!(err, InitializationError::Catalog(_)));
    }
}
