// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for submissions and rate limit state.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Invalid,
    RateLimited,
    Misconfigured,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Invalid => "invalid",
            Self::RateLimited => "rate_limited",
            Self::Misconfigured => "misconfigured",
            Self::Failed => "failed",
        }
    }
}

pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    tracked_identifiers: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("form_submissions_total", "Form submissions by form and outcome"),
            &["form", "outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        let tracked_identifiers = IntGauge::new(
            "rate_limit_entries",
            "Identifiers with live rate limit state after the last sweep",
        )?;
        registry.register(Box::new(tracked_identifiers.clone()))?;

        Ok(Self {
            registry,
            submissions,
            tracked_identifiers,
        })
    }

    pub fn record(&self, form: &str, outcome: Outcome) {
        self.submissions
            .with_label_values(&[form, outcome.as_str()])
            .inc();
    }

    pub fn submissions(&self, form: &str, outcome: Outcome) -> u64 {
        self.submissions
            .with_label_values(&[form, outcome.as_str()])
            .get()
    }

    pub fn set_tracked_identifiers(&self, count: usize) {
        self.tracked_identifiers
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
