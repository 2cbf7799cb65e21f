// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Text sanitization for untrusted form input.
//!
//! Every value that leaves the validator passes through [`sanitize_text`],
//! which removes NUL bytes, trims surrounding whitespace and escapes the
//! characters that could be interpreted as markup when the value is later
//! rendered into an HTML notification.

use serde::Serialize;
use std::fmt;

/// Text that has been NUL-stripped, trimmed and HTML-escaped.
///
/// The only way to obtain one is through [`sanitize_text`], so holding a
/// `SanitizedValue` guarantees it contains none of `< > & " '` unescaped
/// and no NUL byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SanitizedValue(String);

impl SanitizedValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters, which is the unit all field limits use.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Lower-case the value. Entity escapes are already lower-case, so the
    /// invariant is preserved.
    pub(crate) fn to_lowercase(&self) -> Self {
        Self(self.0.to_lowercase())
    }
}

impl fmt::Display for SanitizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SanitizedValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sanitize a raw input string. Never fails; empty input yields an empty value.
pub fn sanitize_text(raw: &str) -> SanitizedValue {
    let without_nul: String = raw.chars().filter(|&c| c != '\0').collect();
    let trimmed = without_nul.trim();

    let mut escaped = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }

    SanitizedValue(escaped)
}
