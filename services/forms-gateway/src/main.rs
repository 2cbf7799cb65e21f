// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! StruXture Forms Gateway Service
//!
//! Accepts job applications and consultation requests, rate limits each
//! caller, validates and sanitizes the fields, and emails a notification.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! read first if present):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX_REQUESTS`: Submissions per window (default: 5)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length (default: 3600)
//! - `RATE_LIMIT_CLEANUP_SECS`: Sweep interval (default: 1800)
//! - `AGGREGATE_VALIDATION_ERRORS`: Report every bad field (default: false)
//! - `MAIL_USER` / `MAIL_PASSWORD`: Mail account identity and credential
//! - `MAIL_API_URL`: Mail relay endpoint
//! - `MAIL_RECIPIENT`: Notification recipient (default: `MAIL_USER`)
//! - `USER_ID_HEADER`: Header carrying an authenticated user id
//! - `TRUST_FORWARDED_FOR`: Take the caller address from X-Forwarded-For
//!   (default: false; enable only behind a proxy that appends to it)
//! - `TRUSTED_PROXY_HOPS`: Proxies appending to X-Forwarded-For (default: 1)
//! - `ALLOWED_ORIGINS`: Comma-separated CORS origins
//! - `METRICS_ENABLED`: Serve `/metrics` (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forms_common::RateLimiter;
use forms_gateway::{
    config::Config,
    handlers::AppState,
    mailer::{HttpMailer, Mailer},
    metrics::Metrics,
    router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        validation_mode = ?config.validation.mode,
        "Starting forms gateway"
    );

    let mailer: Option<Arc<dyn Mailer>> = match config.mail.credentials() {
        Some(credentials) => Some(Arc::new(HttpMailer::new(
            config.mail.api_url.clone(),
            credentials,
        ))),
        None => {
            warn!("MAIL_USER or MAIL_PASSWORD not set; submissions will be refused");
            None
        }
    };

    // Create application state
    let state = Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        mailer,
        metrics: Metrics::new()?,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_state.config.cleanup_interval());
        loop {
            interval.tick().await;
            match cleanup_state.limiter.cleanup_expired().await {
                Ok(removed) => {
                    if let Ok(tracked) = cleanup_state.limiter.tracked().await {
                        cleanup_state.metrics.set_tracked_identifiers(tracked);
                    }
                    if removed > 0 {
                        info!(removed, "Cleaned up expired rate limit entries");
                    }
                }
                Err(err) => error!(error = %err, "Rate limit cleanup failed"),
            }
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
    }
}
