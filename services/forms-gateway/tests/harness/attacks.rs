// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse patterns for security testing.

use chrono::TimeDelta;

/// What each simulated request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// A well-formed consultation request.
    Valid,
    /// Markup in every free-text field.
    Markup,
    /// Message far beyond the length limit.
    Oversized,
    /// Only the name field is filled in.
    MissingFields,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique caller addresses
    pub unique_ips: usize,
    /// Simulated time between requests
    pub spacing: TimeDelta,
    /// Request body kind
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            spacing: TimeDelta::zero(),
            payload: Payload::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single address flood.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            ..Default::default()
        }
    }

    /// Many addresses, each sending more than its quota.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 1000,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// One address pacing itself just under the limit.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 20,
            spacing: TimeDelta::seconds(721),
            ..Default::default()
        }
    }

    /// Markup injection spread over enough addresses to avoid the limit.
    pub fn markup_injection() -> Self {
        Self {
            total_requests: 25,
            unique_ips: 5,
            payload: Payload::Markup,
            ..Default::default()
        }
    }

    /// Oversized bodies from many addresses.
    pub fn oversized_payloads() -> Self {
        Self {
            total_requests: 50,
            unique_ips: 10,
            payload: Payload::Oversized,
            ..Default::default()
        }
    }

    /// Incomplete forms from one address.
    pub fn missing_fields_flood() -> Self {
        Self {
            total_requests: 20,
            payload: Payload::MissingFields,
            ..Default::default()
        }
    }

    /// Most submissions that can get through for the given quota.
    pub fn max_accepted(&self, max_per_window: u32) -> usize {
        if self.payload != Payload::Valid && self.payload != Payload::Markup {
            return 0;
        }
        (self.unique_ips * max_per_window as usize).min(self.total_requests)
    }
}
