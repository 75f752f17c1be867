//! Route definitions: readiness, health, and the inbound command webhook.
//!
//! The command handler does the absolute minimum on the synchronous path:
//! verify the signature, parse the form, spawn the background pipeline, and
//! return the acknowledgment. Everything slow happens after the ack.

use crate::gateway::{AppState, auth, middleware};
use crate::pipeline::{self, CommandRequest};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Immediate acknowledgment / synchronous reply body.
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub response_type: String,
    pub text: String,
}

impl AckResponse {
    fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: "ephemeral".to_string(),
            text: text.into(),
        }
    }
}

/// Health endpoint body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_tasks: Option<usize>,
}

/// Assemble the gateway router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ready))
        .route("/health", get(health))
        .route("/slack/command", post(command))
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

/// GET / - readiness marker
async fn ready() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ready" }))
}

/// GET /health - liveness plus the cached snapshot size. Read-only.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        cached_tasks: state.cache.cached_count().await,
    })
}

/// POST /slack/command - verify, ack immediately, process in the background.
async fn command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AckResponse>, (StatusCode, Json<AckResponse>)> {
    if let Some(secret) = state.config.gateway.signing_secret.as_deref() {
        let timestamp = header_str(&headers, "x-slack-request-timestamp");
        let signature = header_str(&headers, "x-slack-signature");
        let verified = verify(
            secret,
            timestamp,
            signature,
            &body,
            state.config.gateway.max_signature_age_secs,
        );
        if let Err(e) = verified {
            warn!(error = %e, "Rejected inbound command");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(AckResponse::ephemeral("Signature verification failed.")),
            ));
        }
    } else {
        warn!("No signing secret configured; accepting unsigned command");
    }

    let request = parse_command(&body);
    info!(user_id = %request.user_id, state = "received", "Inbound command");

    if request.response_url.is_empty() {
        warn!(user_id = %request.user_id, "Command has no response_url; nothing to deliver to");
        return Ok(Json(AckResponse::ephemeral(
            "This command did not carry a callback address, so no report can be delivered.",
        )));
    }

    // The pipeline runs past the ack deadline; the ack must not wait on it.
    let pipeline_state = state.clone();
    tokio::spawn(async move {
        pipeline::process(pipeline_state, request).await;
    });

    info!(state = "acknowledged", "Returned immediate ack");
    Ok(Json(AckResponse::ephemeral(
        "⏳ On it — pulling the latest task data…",
    )))
}

fn verify(
    secret: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    max_age_secs: u64,
) -> taskintel_core::Result<()> {
    let timestamp = timestamp
        .ok_or_else(|| taskintel_core::IntelError::auth("Missing timestamp header"))?;
    let signature = signature
        .ok_or_else(|| taskintel_core::IntelError::auth("Missing signature header"))?;
    auth::verify_signature(
        secret,
        timestamp,
        signature,
        body,
        Utc::now().timestamp(),
        max_age_secs,
    )
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Parse the form-encoded command body. Unknown fields are ignored; missing
/// fields default to empty.
fn parse_command(body: &[u8]) -> CommandRequest {
    let mut request = CommandRequest::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "text" => request.text = value.trim().to_string(),
            "user_id" => request.user_id = value.into_owned(),
            "response_url" => request.response_url = value.into_owned(),
            _ => {}
        }
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_form() {
        let body = b"token=x&text=what+is+alice+working+on%3F&user_id=U1&response_url=https%3A%2F%2Fhooks.example%2Fabc";
        let cmd = parse_command(body);
        assert_eq!(cmd.text, "what is alice working on?");
        assert_eq!(cmd.user_id, "U1");
        assert_eq!(cmd.response_url, "https://hooks.example/abc");
    }

    #[test]
    fn test_parse_command_missing_fields() {
        let cmd = parse_command(b"user_id=U1");
        assert!(cmd.text.is_empty());
        assert!(cmd.response_url.is_empty());
    }
}
