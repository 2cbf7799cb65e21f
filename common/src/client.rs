// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client-side submission guard.
//!
//! The website checks forms before posting them so users get immediate
//! feedback. Nothing here is a security control: the caller owns this code
//! and its storage. The gateway repeats every check with its own limiter.

use crate::forms::{validate_form, FormErrors, FormSchema, ValidatedForm, ValidationMode};
use crate::limiter::{RateLimitConfig, RateLimitDecision, RateLimiter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// Key the browser stores its submission counter under.
pub const STORAGE_KEY: &str = "form_submissions";

/// What the form UI shows after a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleStatus {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Advisory per-browser limit on form submissions (3 per hour).
pub struct SubmissionThrottle {
    limiter: RateLimiter,
}

impl Default for SubmissionThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionThrottle {
    pub fn new() -> Self {
        Self::with_limiter(RateLimiter::new(RateLimitConfig::client()))
    }

    pub fn with_limiter(limiter: RateLimiter) -> Self {
        Self { limiter }
    }

    /// Count a submission attempt. A broken store lets the submission
    /// through, since the server enforces the real limit anyway.
    pub async fn check(&self) -> ThrottleStatus {
        match self.limiter.check_and_consume(STORAGE_KEY).await {
            Ok(RateLimitDecision::Allowed {
                remaining,
                reset_at,
            }) => ThrottleStatus {
                allowed: true,
                remaining,
                reset_at,
            },
            Ok(RateLimitDecision::Rejected { reset_at }) => ThrottleStatus {
                allowed: false,
                remaining: 0,
                reset_at,
            },
            Err(err) => {
                warn!(error = %err, "Submission throttle unavailable, allowing submission");
                ThrottleStatus {
                    allowed: true,
                    remaining: self.limiter.config().max_requests,
                    reset_at: self.limiter.now(),
                }
            }
        }
    }
}

/// Check a form in the browser, reporting every problem at once so the user
/// can fix them in one pass.
pub fn review_form<F: FormSchema>(form: &F) -> Result<ValidatedForm, FormErrors> {
    validate_form(form, ValidationMode::CollectAll)
}
