// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! StruXture Forms Gateway
//!
//! Server side of the public job application and consultation request
//! forms:
//!
//! - Per-identifier fixed-window rate limiting (5 per hour default)
//! - Field validation and HTML sanitization
//! - Notification email delivery through a mail relay
//! - Callable-style JSON request and error envelopes

pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod metrics;

pub use config::Config;
pub use error::SubmissionError;
pub use handlers::AppState;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the router with all routes and layers attached.
pub fn router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::health))
        .route("/api", get(handlers::api_info))
        .route("/submitJobApplication", post(handlers::submit_job_application))
        .route(
            "/submitConsultationRequest",
            post(handlers::submit_consultation_request),
        );

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(handlers::metrics));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
