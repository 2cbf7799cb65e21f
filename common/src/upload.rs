// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Resume upload checks.
//!
//! Size, declared media type and file-name extension are each enforced on
//! their own. A client can declare any media type, so passing that check
//! never excuses a bad extension.

use crate::sanitize::{sanitize_text, SanitizedValue};
use crate::validator::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 5 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Metadata of a file attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    /// Media type as declared by the client.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
}

/// An upload that passed every check, with its name made safe to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub file_name: SanitizedValue,
    pub content_type: &'static str,
    pub size: u64,
}

/// Validate an uploaded file's size, declared type and extension.
pub fn validate_file_upload(file: &UploadedFile) -> Result<UploadSummary, ValidationError> {
    if file.size > MAX_UPLOAD_BYTES {
        debug!(size = file.size, "Upload too large");
        return Err(ValidationError::FileTooLarge {
            limit: MAX_UPLOAD_BYTES,
            actual: file.size,
        });
    }

    let Some(content_type) = ALLOWED_MEDIA_TYPES
        .iter()
        .copied()
        .find(|allowed| *allowed == file.content_type)
    else {
        debug!(content_type = %file.content_type, "Upload media type rejected");
        return Err(ValidationError::UnsupportedFileType {
            content_type: file.content_type.clone(),
        });
    };

    let lower_name = file.name.to_lowercase();
    let extension_ok = lower_name
        .rfind('.')
        .map(|idx| ALLOWED_EXTENSIONS.contains(&&lower_name[idx..]))
        .unwrap_or(false);
    if !extension_ok {
        debug!(file_name = %file.name, "Upload extension rejected");
        return Err(ValidationError::UnsupportedExtension {
            file_name: file.name.clone(),
        });
    }

    Ok(UploadSummary {
        file_name: sanitize_text(&file.name),
        content_type,
        size: file.size,
    })
}
