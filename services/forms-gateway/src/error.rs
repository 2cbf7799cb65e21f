// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Errors returned to callers of the submission endpoints.
//!
//! Serialized in the callable error envelope:
//! `{"error": {"status": "INVALID_ARGUMENT", "message": "..."}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forms_common::{FormErrors, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Submission failure, one variant per callable status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// A field failed validation; the message names the field and rule.
    #[error("{0}")]
    InvalidArgument(String),

    /// Rate limit hit; the message includes when to retry.
    #[error("{0}")]
    ResourceExhausted(String),

    /// The service is missing configuration it needs.
    #[error("{0}")]
    FailedPrecondition(String),

    /// Anything unexpected. The message never carries internal detail.
    #[error("{0}")]
    Internal(String),
}

impl SubmissionError {
    pub fn status(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition(_) => "FAILED_PRECONDITION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::FailedPrecondition(_) => StatusCode::BAD_REQUEST,
            Self::ResourceExhausted(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<FormErrors> for SubmissionError {
    fn from(errors: FormErrors) -> Self {
        Self::InvalidArgument(errors.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub status: &'static str,
    pub message: String,
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = ErrorResponse {
            error: ErrorDetail {
                status: self.status(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
