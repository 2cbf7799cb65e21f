// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process gateway with deterministic time and a fake mail relay.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use forms_common::{clock::ManualClock, MemoryStore, RateLimiter};
use forms_gateway::{
    config::Config,
    handlers::AppState,
    mailer::{MailError, Mailer, OutboundEmail},
    metrics::Metrics,
    router,
};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const MAIL_USER: &str = "forms@struxture.example";

/// Mailer that keeps every message it is handed.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Mailer whose relay always refuses the message.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), MailError> {
        Err(MailError::Rejected {
            status: 503,
            body: "relay unavailable".to_string(),
        })
    }
}

/// How the mail side of the test app is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailSetup {
    Recording,
    Failing,
    Missing,
}

/// 2025-03-14 09:00:00 UTC
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.mail.user = Some(MAIL_USER.to_string());
    config.mail.password = Some("test-password".to_string());
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub clock: ManualClock,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(test_config(), MailSetup::Recording)
    }

    pub fn with(mut config: Config, mail: MailSetup) -> Self {
        let clock = ManualClock::new(epoch());
        let recording = Arc::new(RecordingMailer::default());

        let mailer: Option<Arc<dyn Mailer>> = match mail {
            MailSetup::Recording => Some(recording.clone()),
            MailSetup::Failing => Some(Arc::new(FailingMailer)),
            MailSetup::Missing => {
                config.mail.user = None;
                config.mail.password = None;
                None
            }
        };

        let limiter = RateLimiter::with_parts(
            config.rate_limit.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(clock.clone()),
        );

        let state = Arc::new(AppState {
            limiter,
            mailer,
            metrics: Metrics::new().unwrap(),
            config,
        });

        Self {
            router: router(state.clone()),
            state,
            clock,
            mailer: recording,
        }
    }

    /// POST a JSON body from a connection whose peer address is `ip`.
    pub async fn post(&self, path: &str, ip: &str, body: &Value) -> (StatusCode, Value) {
        self.post_with_headers(path, ip, &[], body).await
    }

    /// POST from peer `ip` with extra request headers.
    pub async fn post_with_headers(
        &self,
        path: &str,
        ip: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut request = builder.body(Body::from(body.to_string())).unwrap();

        let peer = SocketAddr::new(ip.parse::<IpAddr>().unwrap(), 49152);
        request.extensions_mut().insert(ConnectInfo(peer));
        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
