// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Field validators for form submissions.
//!
//! Each validator sanitizes its input first and then checks the sanitized
//! value against a type-specific rule:
//! - Free text with a length bound
//! - Email address format
//! - Absolute http/https URL
//! - Phone number character set
//! - Membership in a closed set of choices
//!
//! Lengths are counted in characters on the sanitized value.

use crate::sanitize::{sanitize_text, SanitizedValue};
use thiserror::Error;
use tracing::debug;
use url::{Host, Url};

/// Maximum lengths (in characters) for each kind of form field.
pub mod limits {
    pub const NAME: usize = 100;
    /// RFC 5321 path limit.
    pub const EMAIL: usize = 254;
    pub const COMPANY: usize = 200;
    pub const PHONE: usize = 20;
    pub const URL: usize = 2048;
    pub const MESSAGE: usize = 5000;
    pub const COVER_LETTER: usize = 10000;
    pub const EXPERIENCE: usize = 50;
    pub const POSITION: usize = 100;
}

/// Validation error types.
///
/// Callers surface every variant as an invalid-argument failure; the
/// message always names the offending field and the violated constraint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {limit} characters")]
    TooLong { field: String, limit: usize },

    #[error("Invalid {field} format: {expected}")]
    Malformed { field: String, expected: &'static str },

    #[error("Invalid {field}: must be one of {allowed}")]
    NotAllowed { field: String, allowed: String },

    #[error("File size must be at most {limit} bytes, got {actual}")]
    FileTooLarge { limit: u64, actual: u64 },

    #[error("File must be PDF, DOC, or DOCX format, got {content_type:?}")]
    UnsupportedFileType { content_type: String },

    #[error("File must have .pdf, .doc, or .docx extension")]
    UnsupportedExtension { file_name: String },
}

impl ValidationError {
    /// Name of the field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::Malformed { field, .. }
            | Self::NotAllowed { field, .. } => field,
            Self::FileTooLarge { .. }
            | Self::UnsupportedFileType { .. }
            | Self::UnsupportedExtension { .. } => "File",
        }
    }
}

/// The kind of check a field is subject to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Url,
    Phone,
    /// Exact, case-sensitive match against a fixed list.
    Enumerated(&'static [&'static str]),
}

/// Constraint for a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRule {
    /// Key of the field in the submitted payload.
    pub field: &'static str,
    /// Human-readable name used in error messages and notifications.
    pub label: &'static str,
    pub kind: FieldKind,
    pub max_len: usize,
    pub required: bool,
}

impl ValidationRule {
    /// Validate a raw field value. A missing field is treated as empty.
    pub fn apply(&self, raw: Option<&str>) -> Result<SanitizedValue, ValidationError> {
        let raw = raw.unwrap_or_default();
        match self.kind {
            FieldKind::Text => check_text(raw, self.max_len, self.label, self.required),
            FieldKind::Email => check_email(raw, self.label, self.required, self.max_len),
            FieldKind::Url => check_url(raw, self.label, self.required, self.max_len),
            FieldKind::Phone => check_phone(raw, self.label, self.required, self.max_len),
            FieldKind::Enumerated(allowed) => {
                let value = sanitize_text(raw);
                if value.is_empty() {
                    if self.required {
                        return Err(required(self.label));
                    }
                    return Ok(value);
                }
                check_choice(value, allowed, self.label)
            }
        }
    }
}

/// Validate and lower-case a required email address.
pub fn validate_email(raw: &str) -> Result<SanitizedValue, ValidationError> {
    check_email(raw, "Email", true, limits::EMAIL)
}

/// Validate an absolute http/https URL.
pub fn validate_url(
    raw: &str,
    field_name: &str,
    required: bool,
) -> Result<SanitizedValue, ValidationError> {
    check_url(raw, field_name, required, limits::URL)
}

/// Validate a phone number made of digits, whitespace and `+ - ( ) .`.
pub fn validate_phone(raw: &str, required: bool) -> Result<SanitizedValue, ValidationError> {
    check_phone(raw, "Phone number", required, limits::PHONE)
}

/// Validate free text against a length limit.
pub fn validate_text_with_limit(
    raw: &str,
    limit: usize,
    field_name: &str,
    required: bool,
) -> Result<SanitizedValue, ValidationError> {
    check_text(raw, limit, field_name, required)
}

/// Validate that the value is exactly one of `allowed`.
pub fn validate_enum(
    raw: &str,
    allowed: &[&str],
    field_name: &str,
) -> Result<SanitizedValue, ValidationError> {
    check_choice(sanitize_text(raw), allowed, field_name)
}

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn check_length(
    value: SanitizedValue,
    limit: usize,
    field: &str,
) -> Result<SanitizedValue, ValidationError> {
    if value.char_len() > limit {
        debug!(field, limit, len = value.char_len(), "Field too long");
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            limit,
        });
    }
    Ok(value)
}

fn check_text(
    raw: &str,
    limit: usize,
    field: &str,
    is_required: bool,
) -> Result<SanitizedValue, ValidationError> {
    let value = sanitize_text(raw);
    if value.is_empty() && is_required {
        return Err(required(field));
    }
    check_length(value, limit, field)
}

fn check_email(
    raw: &str,
    field: &str,
    is_required: bool,
    limit: usize,
) -> Result<SanitizedValue, ValidationError> {
    let value = sanitize_text(raw).to_lowercase();
    if value.is_empty() {
        return if is_required {
            Err(required(field))
        } else {
            Ok(value)
        };
    }

    let value = check_length(value, limit, field)?;
    if !is_valid_email(value.as_str()) {
        debug!(field, "Malformed email address");
        return Err(ValidationError::Malformed {
            field: field.to_string(),
            expected: "expected an address like name@example.com",
        });
    }
    Ok(value)
}

fn check_url(
    raw: &str,
    field: &str,
    is_required: bool,
    limit: usize,
) -> Result<SanitizedValue, ValidationError> {
    let value = sanitize_text(raw);
    if value.is_empty() {
        return if is_required {
            Err(required(field))
        } else {
            Ok(value)
        };
    }

    let value = check_length(value, limit, field)?;
    if !is_valid_web_url(value.as_str()) {
        debug!(field, "Malformed URL");
        return Err(ValidationError::Malformed {
            field: field.to_string(),
            expected: "must be a valid URL with http:// or https://",
        });
    }
    Ok(value)
}

fn check_phone(
    raw: &str,
    field: &str,
    is_required: bool,
    limit: usize,
) -> Result<SanitizedValue, ValidationError> {
    let value = sanitize_text(raw);
    if value.is_empty() {
        return if is_required {
            Err(required(field))
        } else {
            Ok(value)
        };
    }

    let value = check_length(value, limit, field)?;
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "+-().".contains(c);
    if !value.as_str().chars().all(allowed) {
        debug!(field, "Phone number contains disallowed characters");
        return Err(ValidationError::Malformed {
            field: field.to_string(),
            expected: "only digits, spaces and + - ( ) . are allowed",
        });
    }
    Ok(value)
}

fn check_choice(
    value: SanitizedValue,
    allowed: &[&str],
    field: &str,
) -> Result<SanitizedValue, ValidationError> {
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        debug!(field, value = %value, "Value not in allowed set");
        Err(ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: allowed.join(", "),
        })
    }
}

/// Syntactic check for `local-part@domain`.
fn is_valid_email(address: &str) -> bool {
    let Some((local, domain)) = address.rsplit_once('@') else {
        return false;
    };
    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    const ATEXT_SYMBOLS: &str = "!#$%&'*+/=?^_`{|}~-";

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || ATEXT_SYMBOLS.contains(c))
}

/// Hostname with at least two labels and an alphabetic (or punycode) TLD.
fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld = labels[labels.len() - 1];
    let tld_ok = tld.len() >= 2
        && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"));

    labels_ok && tld_ok
}

/// Absolute http(s) URL with a real host. Bare hostnames fail to parse
/// without a scheme, so they are rejected here too.
fn is_valid_web_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => is_valid_domain(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}
