// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Parser for flat `key=value` properties resources.
//!
//! Both the platform configuration and the error-code catalog are shipped in
//! this format. The supported syntax:
//!
//! - `#` and `!` start a comment line
//! - the key ends at the first unescaped `=`, `:` or whitespace
//! - a line ending in an unescaped `\` continues on the next line
//!   (leading whitespace of the continuation is dropped)
//! - escapes: `\t`, `\n`, `\r`, `\f`, `\uXXXX`, and `\<char>` for the char itself
//!
//! Later duplicates of a key replace earlier ones.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("malformed \\uXXXX escape on line {line}")]
    InvalidUnicodeEscape { line: usize },
}

/// Parsed key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn parse(input: &str) -> Result<Self, PropertiesError> {
        let mut entries = HashMap::new();
        let mut lines = input.lines().enumerate();

        while let Some((index, raw)) = lines.next() {
            let line_no = index + 1;
            let first = raw.trim_start();
            if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
                continue;
            }

            let mut logical = String::from(first);
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start()),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            entries.insert(unescape(key, line_no)?, unescape(value, line_no)?);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// An odd number of trailing backslashes means the last one escapes the newline.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start();
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or(PropertiesError::InvalidUnicodeEscape { line })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separators_and_comments() {
        let props = Properties::parse(
            "# comment\n\
             ! another\n\
             \n\
             host=http://example.org/\n\
             colon: value\n\
             spaced   value with spaces\n\
             empty=\n",
        )
        .unwrap();

        assert_eq!(props.len(), 4);
        assert_eq!(props.get("host"), Some("http://example.org/"));
        assert_eq!(props.get("colon"), Some("value"));
        assert_eq!(props.get("spaced"), Some("value with spaces"));
        assert_eq!(props.get("empty"), Some(""));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn joins_continuation_lines() {
        let props = Properties::parse("list = a, \\\n    b, \\\n    c\n").unwrap();
        assert_eq!(props.get("list"), Some("a, b, c"));
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        let props = Properties::parse("dir=C:\\\\\nnext=1\n").unwrap();
        assert_eq!(props.get("dir"), Some("C:\\"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn decodes_escapes() {
        let props =
            Properties::parse("a\\=b=tab\\there\nmsg=caf\\u00e9\nsep=x\\:y\n").unwrap();
        assert_eq!(props.get("a=b"), Some("tab\there"));
        assert_eq!(props.get("msg"), Some("café"));
        assert_eq!(props.get("sep"), Some("x:y"));
    }

    #[test]
    fn rejects_bad_unicode_escape() {
        let err = Properties::parse("ok=1\nbad=\\u12\n").unwrap_err();
        assert_eq!(err, PropertiesError::InvalidUnicodeEscape { line: 2 });
    }

    #[test]
    fn last_duplicate_wins() {
        let props = Properties::parse("k=1\nk=2\n").unwrap();
        assert_eq!(props.get("k"), Some("2"));
    }
}
