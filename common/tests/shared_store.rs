// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Limiters in separate instances agree when they share one store.

use forms_common::{
    client::SubmissionThrottle, MemoryStore, RateLimitConfig, RateLimitDecision, RateLimitStore,
    RateLimiter,
};
use std::sync::Arc;

#[tokio::test]
async fn test_instances_share_quota() {
    let store = Arc::new(MemoryStore::new());
    let first = RateLimiter::with_store(RateLimitConfig::server(), store.clone());
    let second = RateLimiter::with_store(RateLimitConfig::server(), store.clone());

    for _ in 0..3 {
        assert!(first.check_and_consume("ip_203.0.113.1").await.unwrap().is_allowed());
    }
    for _ in 0..2 {
        assert!(second.check_and_consume("ip_203.0.113.1").await.unwrap().is_allowed());
    }

    let decision = first.check_and_consume("ip_203.0.113.1").await.unwrap();
    assert!(matches!(decision, RateLimitDecision::Rejected { .. }));

    let entry = store.get("ip_203.0.113.1").await.unwrap().unwrap();
    assert_eq!(entry.count, 5);
}

#[tokio::test]
async fn test_remaining_counts_down() {
    let limiter = RateLimiter::new(RateLimitConfig::server());

    let mut remaining = Vec::new();
    for _ in 0..5 {
        if let RateLimitDecision::Allowed { remaining: r, .. } =
            limiter.check_and_consume("user_42").await.unwrap()
        {
            remaining.push(r);
        }
    }

    assert_eq!(remaining, vec![4, 3, 2, 1, 0]);
}

#[tokio::test]
async fn test_client_throttle_independent_of_server() {
    let server = RateLimiter::new(RateLimitConfig::server());
    let throttle = SubmissionThrottle::new();

    for _ in 0..3 {
        assert!(throttle.check().await.allowed);
    }
    let blocked = throttle.check().await;
    assert!(!blocked.allowed);
    assert_eq!(blocked.remaining, 0);

    // The server has seen none of those attempts.
    assert!(server
        .check_and_consume("ip_203.0.113.2")
        .await
        .unwrap()
        .is_allowed());
}
