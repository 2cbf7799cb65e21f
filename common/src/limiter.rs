// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window submission rate limiter.
//!
//! Each identifier gets a window that starts with its first submission.
//! Up to `max_requests` submissions are allowed until the window expires,
//! after which the next submission starts a fresh window. A periodic sweep
//! drops expired entries so idle identifiers do not accumulate.
//!
//! The read-modify-write for one identifier runs under a striped lock, so
//! concurrent requests cannot lose increments. The sweep takes the same
//! per-identifier lock one entry at a time and never holds a lock across
//! the whole store.

use crate::clock::{Clock, SystemClock};
use crate::store::{MemoryStore, RateLimitEntry, RateLimitStore, StoreError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const LOCK_STRIPES: usize = 64;

/// Rate limit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Submissions allowed per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    3600
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::server()
    }
}

impl RateLimitConfig {
    /// Authoritative server-side limit: 5 per hour.
    pub fn server() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }

    /// Advisory client-side limit: 3 per hour.
    pub fn client() -> Self {
        Self {
            max_requests: 3,
            window_secs: default_window_secs(),
        }
    }

    pub fn window(&self) -> TimeDelta {
        let millis = self.window_secs.saturating_mul(1000);
        TimeDelta::milliseconds(i64::try_from(millis).unwrap_or(i64::MAX))
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Submission counted.
    Allowed {
        /// Submissions left in the current window
        remaining: u32,
        /// When the current window ends
        reset_at: DateTime<Utc>,
    },
    /// Quota exhausted; nothing was counted.
    Rejected {
        /// When the caller may submit again
        reset_at: DateTime<Utc>,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn reset_at(&self) -> DateTime<Utc> {
        match self {
            Self::Allowed { reset_at, .. } | Self::Rejected { reset_at } => *reset_at,
        }
    }
}

/// Fixed-window rate limiter over an injected store.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    locks: Box<[Mutex<()>]>,
}

impl RateLimiter {
    /// Limiter backed by an in-process store and the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: RateLimitConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self::with_parts(config, store, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: RateLimitConfig,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let locks = (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect();
        Self {
            config,
            store,
            clock,
            locks,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock_for(&self, identifier: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        identifier.hash(&mut hasher);
        &self.locks[(hasher.finish() as usize) % self.locks.len()]
    }

    /// Count a submission for `identifier`, or reject it if the quota for
    /// the current window is used up.
    pub async fn check_and_consume(
        &self,
        identifier: &str,
    ) -> Result<RateLimitDecision, StoreError> {
        let _guard = self.lock_for(identifier).lock().await;
        let now = self.clock.now();
        let window = self.config.window();
        let max = self.config.max_requests;

        match self.store.get(identifier).await? {
            Some(entry) if !entry.is_expired(now, window) => {
                let reset_at = entry.reset_at(window);
                if entry.count >= max {
                    debug!(%identifier, count = entry.count, %reset_at, "Rate limit exceeded");
                    return Ok(RateLimitDecision::Rejected { reset_at });
                }

                let updated = RateLimitEntry {
                    count: entry.count + 1,
                    ..entry
                };
                self.store.set(identifier, updated).await?;
                debug!(%identifier, count = updated.count, "Submission counted");
                Ok(RateLimitDecision::Allowed {
                    remaining: max.saturating_sub(updated.count),
                    reset_at,
                })
            }
            previous => {
                if previous.is_some() {
                    debug!(%identifier, "Rate limit window rolled over");
                }
                let entry = RateLimitEntry::first(now);
                self.store.set(identifier, entry).await?;
                Ok(RateLimitDecision::Allowed {
                    remaining: max.saturating_sub(entry.count),
                    reset_at: entry.reset_at(window),
                })
            }
        }
    }

    /// Remove every entry whose window has expired. Returns how many were
    /// removed.
    pub async fn cleanup_expired(&self) -> Result<usize, StoreError> {
        let window = self.config.window();
        let mut removed = 0;

        for identifier in self.store.identifiers().await? {
            let _guard = self.lock_for(&identifier).lock().await;
            let now = self.clock.now();
            if let Some(entry) = self.store.get(&identifier).await? {
                if entry.is_expired(now, window) {
                    self.store.delete(&identifier).await?;
                    removed += 1;
                }
            }
        }

        debug!(removed, "Swept expired rate limit entries");
        Ok(removed)
    }

    /// Number of identifiers currently tracked.
    pub async fn tracked(&self) -> Result<usize, StoreError> {
        Ok(self.store.identifiers().await?.len())
    }
}
