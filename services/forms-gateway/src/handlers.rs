// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the forms gateway.
//!
//! Every submission goes through the same pipeline:
//! 1. Resolve the caller's identifier and check the rate limit
//! 2. Read the body, then validate and sanitize every field
//! 3. Check the mail account is configured
//! 4. Send the notification
//!
//! The first failing step ends the request with a typed error.

use crate::config::{Config, IdentityConfig};
use crate::error::SubmissionError;
use crate::mailer::{Mailer, OutboundEmail};
use crate::metrics::{Metrics, Outcome};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use forms_common::{
    decode_form, validate_form, ConsultationRequestInput, FormSchema, Identifier,
    JobApplicationInput, RateLimitDecision, RateLimiter,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    /// `None` when the mail account is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
    pub metrics: Metrics,
    pub config: Config,
}

/// Callable request envelope.
#[derive(Debug, Deserialize)]
pub struct CallableRequest<T> {
    pub data: T,
}

/// Callable success envelope.
#[derive(Debug, Serialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

/// Acknowledgment returned for an accepted submission.
#[derive(Debug, Serialize)]
pub struct SubmissionAck {
    pub success: bool,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
}

/// API description response.
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "StruXture forms gateway is running",
        timestamp: Utc::now().to_rfc3339(),
        service: "forms-gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Describe the available endpoints.
pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Welcome to the StruXture forms API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "/health",
            "/api",
            "/submitJobApplication",
            "/submitConsultationRequest",
        ],
    })
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Submit a job application.
pub async fn submit_job_application(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<CallableRequest<Value>>, JsonRejection>,
) -> Result<Json<CallableResponse<SubmissionAck>>, SubmissionError> {
    let identifier = client_identifier(&headers, peer.map(|c| c.0), &state.config.identity);

    process_submission::<JobApplicationInput>(
        &state,
        &identifier,
        payload,
        "Application submitted successfully",
    )
    .await
}

/// Submit a consultation request.
pub async fn submit_consultation_request(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<CallableRequest<Value>>, JsonRejection>,
) -> Result<Json<CallableResponse<SubmissionAck>>, SubmissionError> {
    let identifier = client_identifier(&headers, peer.map(|c| c.0), &state.config.identity);

    process_submission::<ConsultationRequestInput>(
        &state,
        &identifier,
        payload,
        "Consultation request submitted successfully",
    )
    .await
}

fn reject_body(rejection: JsonRejection) -> SubmissionError {
    debug!(error = %rejection, "Unreadable request body");
    SubmissionError::InvalidArgument("Request body must be a JSON object with a data field".into())
}

/// Run one submission through rate limiting, validation and delivery.
///
/// The body is only looked at once the caller is within quota.
pub async fn process_submission<F>(
    state: &AppState,
    identifier: &Identifier,
    payload: Result<Json<CallableRequest<Value>>, JsonRejection>,
    success_message: &str,
) -> Result<Json<CallableResponse<SubmissionAck>>, SubmissionError>
where
    F: FormSchema + DeserializeOwned,
{
    let result = deliver::<F>(state, identifier, payload).await;

    let outcome = match &result {
        Ok(()) => Outcome::Accepted,
        Err(SubmissionError::InvalidArgument(_)) => Outcome::Invalid,
        Err(SubmissionError::ResourceExhausted(_)) => Outcome::RateLimited,
        Err(SubmissionError::FailedPrecondition(_)) => Outcome::Misconfigured,
        Err(SubmissionError::Internal(_)) => Outcome::Failed,
    };
    state.metrics.record(F::NAME, outcome);

    result?;
    info!(form = F::NAME, %identifier, "Submission accepted");
    Ok(Json(CallableResponse {
        result: SubmissionAck {
            success: true,
            message: success_message.to_string(),
        },
    }))
}

async fn deliver<F>(
    state: &AppState,
    identifier: &Identifier,
    payload: Result<Json<CallableRequest<Value>>, JsonRejection>,
) -> Result<(), SubmissionError>
where
    F: FormSchema + DeserializeOwned,
{
    let decision = state
        .limiter
        .check_and_consume(identifier.as_str())
        .await
        .map_err(|err| {
            error!(form = F::NAME, %identifier, error = %err, "Rate limit store failed");
            internal_error::<F>()
        })?;

    if let RateLimitDecision::Rejected { reset_at } = decision {
        info!(form = F::NAME, %identifier, %reset_at, "Submission rate limited");
        return Err(SubmissionError::ResourceExhausted(format!(
            "Too many requests. Please try again after {}",
            reset_at.format("%H:%M:%S UTC")
        )));
    }

    let Json(request) = payload.map_err(reject_body)?;
    let mode = state.config.validation.mode;
    let validated = decode_form::<F>(request.data, mode)
        .and_then(|form| validate_form(&form, mode))
        .map_err(|errors| {
            info!(form = F::NAME, %identifier, error = %errors, "Validation failed");
            SubmissionError::from(errors)
        })?;

    let mail = &state.config.mail;
    let (Some(mailer), Some(credentials), Some(recipient)) =
        (&state.mailer, mail.credentials(), mail.recipient())
    else {
        warn!(form = F::NAME, "Mail account not configured");
        return Err(SubmissionError::FailedPrecondition(
            "Email service is not configured".into(),
        ));
    };

    let email = OutboundEmail::notification(&validated, &credentials.user, recipient);
    mailer.send(&email).await.map_err(|err| {
        error!(form = F::NAME, %identifier, error = %err, "Failed to send notification");
        internal_error::<F>()
    })
}

fn internal_error<F: FormSchema>() -> SubmissionError {
    SubmissionError::Internal(format!(
        "Failed to submit {}. Please try again later.",
        F::TITLE.to_lowercase()
    ))
}

/// Work out who is calling.
///
/// A user id is only taken from the configured header, which a trusted
/// upstream must set. With X-Forwarded-For trusted, the caller address is
/// the entry appended by the outermost trusted proxy, counted from the
/// right; anything left of it is client supplied. Otherwise the socket
/// peer is used.
pub fn client_identifier(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    identity: &IdentityConfig,
) -> Identifier {
    let user_id = identity
        .user_id_header
        .as_deref()
        .and_then(|name| headers.get(name))
        .and_then(|v| v.to_str().ok());

    let address = identity
        .trust_forwarded_for
        .then(|| forwarded_address(headers, identity.trusted_proxy_hops))
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip()));

    Identifier::resolve(user_id, address.map(|ip| ip.to_string()).as_deref())
}

fn forwarded_address(headers: &HeaderMap, hops: usize) -> Option<IpAddr> {
    let chain: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect();

    let index = chain.len().checked_sub(hops)?;
    chain.get(index)?.parse().ok()
}
