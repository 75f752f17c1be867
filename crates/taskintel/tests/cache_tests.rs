//! Aggregation cache behavior: concurrency, fault isolation, TTL.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taskintel::cache::AggregationCache;
use taskintel::source::CollectionSource;
use taskintel_core::config::DepartmentConfig;
use taskintel_core::error::{IntelError, Result};
use taskintel_core::task::Task;

/// Counting fake source: departments in `failing` always fault, everything
/// else returns `tasks_per_department` fresh tasks after `delay`.
struct FakeSource {
    calls: AtomicUsize,
    failing: HashSet<String>,
    tasks_per_department: usize,
    delay: Duration,
}

impl FakeSource {
    fn new(tasks_per_department: usize, failing: &[&str]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing: failing.iter().map(|s| s.to_string()).collect(),
            tasks_per_department,
            delay: Duration::ZERO,
        }
    }

    fn slow(tasks_per_department: usize, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(tasks_per_department, &[])
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionSource for FakeSource {
    async fn fetch(&self, department: &DepartmentConfig) -> Result<Vec<Task>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(&department.name) {
            return Err(IntelError::timeout(format!(
                "{} timed out",
                department.name
            )));
        }
        Ok((0..self.tasks_per_department)
            .map(|i| {
                let mut t = Task::new(format!("{} task {i}", department.name));
                t.department = department.name.clone();
                t
            })
            .collect())
    }
}

fn dept(name: &str) -> DepartmentConfig {
    DepartmentConfig {
        name: name.to_string(),
        collection_id: Some(format!("db-{}", name.to_lowercase())),
    }
}

fn unconfigured(name: &str) -> DepartmentConfig {
    DepartmentConfig {
        name: name.to_string(),
        collection_id: None,
    }
}

#[tokio::test]
async fn partial_failure_returns_surviving_collection() {
    let source = Arc::new(FakeSource::new(5, &["Finance"]));
    let cache = AggregationCache::new(
        source.clone(),
        vec![dept("Tech"), dept("Finance")],
        Duration::from_secs(60),
    );

    let snapshot = cache.get_tasks().await;
    assert_eq!(snapshot.len(), 5);
    assert!(snapshot.iter().all(|t| t.department == "Tech"));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn cache_hit_issues_no_remote_fetches() {
    let source = Arc::new(FakeSource::new(3, &[]));
    let cache = AggregationCache::new(
        source.clone(),
        vec![dept("Tech"), dept("Operations")],
        Duration::from_secs(60),
    );

    let first = cache.get_tasks().await;
    let second = cache.get_tasks().await;
    assert_eq!(first.len(), 6);
    assert_eq!(second.len(), 6);
    // one fetch round for two collections, nothing more
    assert_eq!(source.calls(), 2);
    assert_eq!(cache.cached_count().await, Some(6));
}

#[tokio::test]
async fn expiry_triggers_exactly_one_round_per_collection() {
    let source = Arc::new(FakeSource::new(1, &[]));
    let cache = AggregationCache::new(
        source.clone(),
        vec![dept("Tech"), dept("Operations")],
        Duration::from_millis(50),
    );

    cache.get_tasks().await;
    assert_eq!(source.calls(), 2);

    tokio::time::sleep(Duration::from_millis(80)).await;
    cache.get_tasks().await;
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn all_fault_empty_refill_is_not_cached() {
    let source = Arc::new(FakeSource::new(5, &["Tech", "Finance"]));
    let cache = AggregationCache::new(
        source.clone(),
        vec![dept("Tech"), dept("Finance")],
        Duration::from_secs(60),
    );

    let snapshot = cache.get_tasks().await;
    assert!(snapshot.is_empty());
    assert_eq!(cache.cached_count().await, None);

    // next call retries immediately instead of serving the empty snapshot
    cache.get_tasks().await;
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn unconfigured_departments_are_silently_skipped() {
    let source = Arc::new(FakeSource::new(2, &[]));
    let cache = AggregationCache::new(
        source.clone(),
        vec![dept("Tech"), unconfigured("Commercial")],
        Duration::from_secs(60),
    );

    let snapshot = cache.get_tasks().await;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn abandoned_caller_does_not_abort_the_refill() {
    let source = Arc::new(FakeSource::slow(3, Duration::from_millis(200)));
    let cache = Arc::new(AggregationCache::new(
        source.clone(),
        vec![dept("Tech")],
        Duration::from_secs(60),
    ));

    // caller gives up long before the fetch completes
    let abandoned = tokio::time::timeout(Duration::from_millis(50), cache.get_tasks()).await;
    assert!(abandoned.is_err());

    // the fetch keeps running and its snapshot still lands in the cache
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(cache.cached_count().await, Some(3));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn concurrent_misses_share_one_refill() {
    let source = Arc::new(FakeSource::new(2, &[]));
    let cache = Arc::new(AggregationCache::new(
        source.clone(),
        vec![dept("Tech")],
        Duration::from_secs(60),
    ));

    let a = tokio::spawn({
        let cache = cache.clone();
        async move { cache.get_tasks().await.len() }
    });
    let b = tokio::spawn({
        let cache = cache.clone();
        async move { cache.get_tasks().await.len() }
    });
    assert_eq!(a.await.unwrap(), 2);
    assert_eq!(b.await.unwrap(), 2);
    assert_eq!(source.calls(), 1);
}
