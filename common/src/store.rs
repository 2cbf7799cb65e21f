// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Storage for per-identifier rate limit state.
//!
//! The limiter only needs get/set/delete plus a way to list keys for the
//! expiry sweep. [`MemoryStore`] keeps state in-process; a deployment with
//! several instances can implement [`RateLimitStore`] over a shared cache so
//! all instances see the same counts.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Submission count for one identifier in its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitEntry {
    /// At least 1 while the entry exists.
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl RateLimitEntry {
    /// Entry for the first submission of a new window.
    pub fn first(now: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    /// The window has expired once strictly more than `window` has passed.
    pub fn is_expired(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        now.signed_duration_since(self.window_start) > window
    }

    pub fn reset_at(&self, window: TimeDelta) -> DateTime<Utc> {
        self.window_start
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store of rate limit entries.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn get(&self, identifier: &str) -> Result<Option<RateLimitEntry>, StoreError>;

    async fn set(&self, identifier: &str, entry: RateLimitEntry) -> Result<(), StoreError>;

    async fn delete(&self, identifier: &str) -> Result<(), StoreError>;

    /// Snapshot of every identifier currently stored.
    async fn identifiers(&self) -> Result<Vec<String>, StoreError>;
}

/// In-process store. State lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn get(&self, identifier: &str) -> Result<Option<RateLimitEntry>, StoreError> {
        Ok(self.entries.get(identifier).map(|entry| *entry))
    }

    async fn set(&self, identifier: &str, entry: RateLimitEntry) -> Result<(), StoreError> {
        self.entries.insert(identifier.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), StoreError> {
        self.entries.remove(identifier);
        Ok(())
    }

    async fn identifiers(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.iter().map(|entry| entry.key().clone()).collect())
    }
}
