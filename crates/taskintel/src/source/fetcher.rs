//! Per-collection fetching with fault isolation.
//!
//! One fetch walks every page of one department's collection under a single
//! bounded timeout. Failures never propagate past the caller that owns the
//! aggregation; they surface as an `Err` the cache converts into an empty
//! partial result.

use crate::source::client::SourceClient;
use crate::source::normalize::normalize_record;
use async_trait::async_trait;
use std::time::Duration;
use taskintel_core::config::DepartmentConfig;
use taskintel_core::error::{IntelError, Result};
use taskintel_core::roster::Roster;
use taskintel_core::task::Task;
use tracing::{debug, warn};

/// A source of normalized tasks for one department collection.
///
/// The trait seam exists so the aggregation cache can be driven by fakes in
/// tests; production uses [`HttpCollectionSource`].
#[async_trait]
pub trait CollectionSource: Send + Sync {
    async fn fetch(&self, department: &DepartmentConfig) -> Result<Vec<Task>>;
}

/// Real paginated fetcher over the task-source HTTP API.
pub struct HttpCollectionSource {
    client: SourceClient,
    roster: Roster,
    timeout: Duration,
}

impl HttpCollectionSource {
    pub fn new(client: SourceClient, roster: Roster, timeout: Duration) -> Self {
        Self {
            client,
            roster,
            timeout,
        }
    }

    async fn fetch_all_pages(&self, department: &DepartmentConfig) -> Result<Vec<Task>> {
        let collection_id = department.collection_id.as_deref().ok_or_else(|| {
            IntelError::config(format!("Department {} has no collection id", department.name))
        })?;

        let mut tasks = Vec::new();
        let mut discarded = 0usize;
        let mut cursor: Option<String> = None;

        loop {
            let page = self.client.query_page(collection_id, cursor.as_deref()).await?;
            for record in &page.results {
                match normalize_record(record, &self.roster) {
                    Some(mut task) => {
                        // The department label always comes from the fetch,
                        // never from the record itself.
                        task.department = department.name.clone();
                        tasks.push(task);
                    }
                    None => discarded += 1,
                }
            }
            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        if discarded > 0 {
            warn!(
                department = %department.name,
                discarded,
                "Discarded records without a task name"
            );
        }
        debug!(department = %department.name, count = tasks.len(), "Fetched collection");
        Ok(tasks)
    }
}

#[async_trait]
impl CollectionSource for HttpCollectionSource {
    /// Fetch one department's tasks, bounded by the per-source timeout.
    /// A timed-out fetch is abandoned, not retried within the request.
    async fn fetch(&self, department: &DepartmentConfig) -> Result<Vec<Task>> {
        tokio::time::timeout(self.timeout, self.fetch_all_pages(department))
            .await
            .map_err(|_| {
                IntelError::timeout(format!(
                    "Fetch of {} exceeded {}s",
                    department.name,
                    self.timeout.as_secs()
                ))
            })?
    }
}
