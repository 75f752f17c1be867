//! HTTP client for the task-source API.
//!
//! Thin paginated query client: one `POST /v1/databases/{id}/query` per
//! page, bearer-token auth, typed error mapping from transport failures.

use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use taskintel_core::config::SourceConfig;
use taskintel_core::error::{IntelError, Result};
use tracing::debug;

/// One page of raw records plus the continuation cursor.
#[derive(Debug, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Read-only client for one task-source account.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    api_token: Option<String>,
    page_size: usize,
}

impl SourceClient {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IntelError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_token: config.api_token.clone(),
            page_size: config.page_size,
        })
    }

    /// Whether a token is configured at all.
    pub fn has_credentials(&self) -> bool {
        self.api_token.is_some()
    }

    /// Fetch one page of a collection.
    pub async fn query_page(
        &self,
        collection_id: &str,
        cursor: Option<&str>,
    ) -> Result<QueryPage> {
        let token = self
            .api_token
            .as_deref()
            .ok_or_else(|| IntelError::config("Task source token not configured"))?;

        let url = format!("{}/v1/databases/{collection_id}/query", self.base_url);
        let mut body = json!({ "page_size": self.page_size });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }
        debug!(collection = %collection_id, cursor = ?cursor, "Querying collection page");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IntelError::source(format!(
                "Collection {collection_id} query failed: HTTP {status}: {text}"
            )));
        }

        response
            .json::<QueryPage>()
            .await
            .map_err(|e| IntelError::invalid_response(format!("Malformed query page: {e}")))
    }
}

fn map_transport_error(err: reqwest::Error) -> IntelError {
    if err.is_timeout() {
        IntelError::timeout(err.to_string())
    } else {
        IntelError::source(err.to_string())
    }
}
