//! The command gateway: inbound webhook, immediate acknowledgment, and the
//! shared application state behind every route.

pub mod auth;
pub mod middleware;
pub mod routes;

use crate::cache::AggregationCache;
use crate::delivery::DeliveryClient;
use crate::source::CollectionSource;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use taskintel_core::config::IntelConfig;
use taskintel_core::error::Result;
use taskintel_core::roster::Roster;
use taskintel_core::{Classifier, ContextStore, Formatter};

pub use routes::build_router;

/// Shared state for the gateway routes and the background pipeline.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<IntelConfig>,
    pub cache: Arc<AggregationCache>,
    pub classifier: Arc<Classifier>,
    pub formatter: Formatter,
    pub delivery: Arc<DeliveryClient>,
}

impl AppState {
    /// Assemble the full pipeline over any collection source (the HTTP one
    /// in production, fakes in tests).
    pub fn new(config: Arc<IntelConfig>, source: Arc<dyn CollectionSource>) -> Result<Self> {
        let cache = Arc::new(AggregationCache::new(
            source,
            config.departments.clone(),
            Duration::from_secs(config.cache.ttl_secs),
        ));

        let roster = Roster::new(
            config.roster.people.clone(),
            config.roster.user_ids.clone(),
        );
        let context = Arc::new(ContextStore::with_ttl(ChronoDuration::seconds(
            config.context.ttl_secs as i64,
        )));
        let classifier = Arc::new(Classifier::new(
            roster,
            config.department_names(),
            context,
        ));

        let formatter = Formatter::new(config.display.max_items);
        let delivery = Arc::new(DeliveryClient::new(&config.delivery)?);

        Ok(Self {
            config,
            cache,
            classifier,
            formatter,
            delivery,
        })
    }
}
