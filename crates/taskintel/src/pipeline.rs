//! The background phase of the two-phase response.
//!
//! Runs after the acknowledgment has already gone out: classify, fetch the
//! snapshot, filter, format, deliver. The whole phase runs under a soft
//! timeout; on expiry the in-flight formatting/delivery is cancelled and an
//! error report is delivered instead. Collection fetches are never
//! cancelled from here — they own their per-source timeout, and partial
//! results already merged into the cache stay valid for later callers.

use crate::gateway::AppState;
use chrono::Utc;
use std::time::Duration;
use taskintel_core::filter;
use tracing::{error, info, warn};

/// One parsed inbound command.
#[derive(Debug, Clone, Default)]
pub struct CommandRequest {
    pub text: String,
    pub user_id: String,
    pub response_url: String,
}

/// Run the processing phase and deliver the outcome. Terminal states are
/// `delivered` and `delivered_error`; both are logged, neither panics.
pub async fn process(state: AppState, request: CommandRequest) {
    info!(user_id = %request.user_id, state = "processing", "Building report");
    let budget = Duration::from_secs(state.config.gateway.processing_timeout_secs);

    let report = match tokio::time::timeout(budget, build_report(&state, &request)).await {
        Ok(report) => report,
        Err(_) => {
            warn!(
                user_id = %request.user_id,
                budget_secs = budget.as_secs(),
                state = "failed",
                "Processing exceeded its budget"
            );
            "⏱️ That took longer than expected. The task sources are slow right now — \
             please try again in a minute."
                .to_string()
        }
    };

    match state.delivery.deliver(&request.response_url, &report).await {
        Ok(()) => info!(user_id = %request.user_id, state = "delivered", "Report delivered"),
        Err(e) => {
            error!(
                user_id = %request.user_id,
                error = %e,
                state = "delivered_error",
                "Report could not be delivered"
            );
        }
    }
}

/// Classify, fetch, filter, format. Infallible by design: classification
/// always produces an intent, and source faults surface as an empty
/// snapshot which the formatter reports explicitly.
async fn build_report(state: &AppState, request: &CommandRequest) -> String {
    let now = Utc::now();
    let intent = state.classifier.classify(&request.text, &request.user_id, now);

    let snapshot = state.cache.get_tasks().await;
    let today = now.date_naive();
    let selected = filter::select(&snapshot, &intent, today);

    state
        .formatter
        .render(&intent, &selected, snapshot.len(), today)
}
