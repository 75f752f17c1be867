//! The aggregation cache: the sole point of truth for "current" task state.
//!
//! On a miss (or TTL expiry) every configured collection is fetched
//! concurrently; whatever succeeds is merged into one snapshot and cached
//! under a single key. A refill that produced zero tasks *because of
//! faults* is never cached, so the next caller retries instead of pinning
//! an all-failure empty snapshot for the whole TTL window.

use crate::source::CollectionSource;
use std::sync::Arc;
use std::time::Duration;
use taskintel_core::config::DepartmentConfig;
use taskintel_core::task::Task;
use tracing::{debug, error, info, warn};

type Snapshot = Arc<Vec<Task>>;

/// TTL cache over the merged multi-collection snapshot.
pub struct AggregationCache {
    source: Arc<dyn CollectionSource>,
    departments: Vec<DepartmentConfig>,
    snapshot: moka::future::Cache<(), Snapshot>,
    refill_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AggregationCache {
    pub fn new(
        source: Arc<dyn CollectionSource>,
        departments: Vec<DepartmentConfig>,
        ttl: Duration,
    ) -> Self {
        let snapshot = moka::future::Cache::builder()
            .max_capacity(1)
            .time_to_live(ttl)
            .build();
        Self {
            source,
            departments,
            snapshot,
            refill_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Current merged snapshot, fetched fresh if the cached one expired.
    ///
    /// Per-collection faults are logged and contribute an empty partial
    /// result; they never abort sibling fetches or this call.
    ///
    /// The refill itself runs on a detached task: a caller that stops
    /// waiting (a cancelled request, an expired processing budget) does not
    /// abort the in-flight fetches, and the finished snapshot still lands
    /// in the cache for subsequent callers.
    pub async fn get_tasks(&self) -> Snapshot {
        if let Some(snapshot) = self.snapshot.get(&()).await {
            debug!(tasks = snapshot.len(), "Cache hit");
            return snapshot;
        }

        // One refill at a time; latecomers reuse the winner's snapshot.
        // The owned guard moves into the refill task so the lock is held
        // for the refill's whole lifetime, not the caller's.
        let guard = self.refill_lock.clone().lock_owned().await;
        if let Some(snapshot) = self.snapshot.get(&()).await {
            return snapshot;
        }

        let source = self.source.clone();
        let departments = self.departments.clone();
        let cache = self.snapshot.clone();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let (tasks, faults) = refill(source.as_ref(), &departments).await;
            let snapshot: Snapshot = Arc::new(tasks);

            if snapshot.is_empty() && faults > 0 {
                warn!(faults, "Refill yielded no tasks due to faults; not caching");
            } else {
                cache.insert((), snapshot.clone()).await;
            }
            snapshot
        });

        match handle.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Refill task failed");
                Arc::new(Vec::new())
            }
        }
    }

    /// Number of tasks in the cached snapshot, if one is live.
    pub async fn cached_count(&self) -> Option<usize> {
        self.snapshot.get(&()).await.map(|s| s.len())
    }
}

/// Fetch every configured collection concurrently and merge the successful
/// partials. Returns the merged tasks and the fault count.
async fn refill(
    source: &dyn CollectionSource,
    departments: &[DepartmentConfig],
) -> (Vec<Task>, usize) {
    let configured: Vec<&DepartmentConfig> = departments
        .iter()
        .filter(|d| {
            if d.collection_id.is_none() {
                debug!(department = %d.name, "No collection id configured; skipping");
                return false;
            }
            true
        })
        .collect();

    let fetches = configured.iter().map(|dept| source.fetch(dept));
    let results = futures::future::join_all(fetches).await;

    let mut tasks = Vec::new();
    let mut faults = 0usize;
    for (dept, result) in configured.iter().zip(results) {
        match result {
            Ok(mut fetched) => tasks.append(&mut fetched),
            Err(e) => {
                faults += 1;
                warn!(department = %dept.name, error = %e, "Collection fetch failed");
            }
        }
    }

    info!(
        tasks = tasks.len(),
        collections = configured.len(),
        faults,
        "Refilled task snapshot"
    );
    (tasks, faults)
}
