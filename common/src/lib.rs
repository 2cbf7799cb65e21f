// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared form guard for the StruXture website.
//!
//! One implementation of field sanitization, validation and submission
//! rate limiting, used by both sides of the trust boundary:
//!
//! - The submission gateway, which is the authoritative check
//! - The website's form UI, which only uses it for early feedback
//!   ([`client`])
//!
//! Rate limit state sits behind [`store::RateLimitStore`], so instances
//! can share one store instead of each keeping its own counts.

pub mod clock;
pub mod client;
pub mod forms;
pub mod identifier;
pub mod limiter;
pub mod sanitize;
pub mod store;
pub mod upload;
pub mod validator;

pub use forms::{
    decode_form, validate_form, ConsultationRequestInput, FormErrors, FormSchema, JobApplicationInput,
    ValidatedForm, ValidationMode,
};
pub use identifier::Identifier;
pub use limiter::{RateLimitConfig, RateLimitDecision, RateLimiter};
pub use sanitize::{sanitize_text, SanitizedValue};
pub use store::{MemoryStore, RateLimitEntry, RateLimitStore, StoreError};
pub use validator::{ValidationError, ValidationRule};
