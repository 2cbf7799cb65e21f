// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the forms gateway.
//!
//! Defaults match the production deployment: 5 submissions per identifier
//! per hour, swept every 30 minutes, fail-fast validation.

use forms_common::{RateLimitConfig, ValidationMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the forms gateway service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-identifier submission limit
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Interval between expired-entry sweeps in seconds (default: 1800)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// How callers are identified for rate limiting
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Origins allowed to call the endpoints from a browser
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Validation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Report only the first bad field, or all of them (default: fail fast)
    #[serde(default)]
    pub mode: ValidationMode,
}

/// Outbound mail account. Missing identity or credential does not stop
/// the service; submissions fail with a precondition error instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Account identity, also the sender address
    #[serde(default)]
    pub user: Option<String>,

    /// Account credential
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Mail relay API endpoint
    #[serde(default = "default_mail_api_url")]
    pub api_url: String,

    /// Override recipient (default: the account identity)
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Account identity and credential, both present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub user: String,
    pub password: String,
}

/// Identity resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Header carrying an authenticated user id, set by a trusted upstream
    /// (default: none)
    #[serde(default)]
    pub user_id_header: Option<String>,

    /// Take the caller address from X-Forwarded-For (default: false).
    /// Only enable behind a proxy that appends the address it saw.
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Number of trusted proxies appending to X-Forwarded-For. The caller
    /// address is this many entries from the right (default: 1)
    #[serde(default = "default_proxy_hops")]
    pub trusted_proxy_hops: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_cleanup_interval_secs() -> u64 {
    1800 // 30 minutes
}

fn default_mail_api_url() -> String {
    "http://127.0.0.1:8025/api/send".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["https://localhost".to_string()]
}

fn default_proxy_hops() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::server(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            validation: ValidationConfig::default(),
            mail: MailConfig::default(),
            identity: IdentityConfig::default(),
            allowed_origins: default_allowed_origins(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            api_url: default_mail_api_url(),
            recipient: None,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_id_header: None,
            trust_forwarded_for: false,
            trusted_proxy_hops: default_proxy_hops(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl MailConfig {
    /// Identity and credential, if both are set and non-empty.
    pub fn credentials(&self) -> Option<MailCredentials> {
        let user = self.user.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let password = self.password.as_deref().filter(|s| !s.is_empty())?;
        Some(MailCredentials {
            user: user.to_string(),
            password: password.to_string(),
        })
    }

    /// Where notifications go: the override if set, else the account itself.
    pub fn recipient(&self) -> Option<&str> {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        non_empty(&self.recipient).or_else(|| non_empty(&self.user))
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// unset or unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_requests: parse(lookup("RATE_LIMIT_MAX_REQUESTS"))
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_secs: parse(lookup("RATE_LIMIT_WINDOW_SECS"))
                    .unwrap_or(defaults.rate_limit.window_secs),
            },
            cleanup_interval_secs: parse(lookup("RATE_LIMIT_CLEANUP_SECS"))
                .unwrap_or(defaults.cleanup_interval_secs),
            validation: ValidationConfig {
                mode: match parse::<bool>(lookup("AGGREGATE_VALIDATION_ERRORS")) {
                    Some(true) => ValidationMode::CollectAll,
                    _ => ValidationMode::FailFast,
                },
            },
            mail: MailConfig {
                user: lookup("MAIL_USER"),
                password: lookup("MAIL_PASSWORD"),
                api_url: lookup("MAIL_API_URL").unwrap_or(defaults.mail.api_url),
                recipient: lookup("MAIL_RECIPIENT"),
            },
            identity: IdentityConfig {
                user_id_header: lookup("USER_ID_HEADER"),
                trust_forwarded_for: parse(lookup("TRUST_FORWARDED_FOR"))
                    .unwrap_or(defaults.identity.trust_forwarded_for),
                trusted_proxy_hops: parse(lookup("TRUSTED_PROXY_HOPS"))
                    .unwrap_or(defaults.identity.trusted_proxy_hops),
            },
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            metrics: MetricsConfig {
                enabled: parse(lookup("METRICS_ENABLED")).unwrap_or(defaults.metrics.enabled),
                path: defaults.metrics.path,
            },
        }
    }

    /// Get the sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}
