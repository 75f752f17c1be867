//! Short-term conversation memory.
//!
//! Remembers the last person a user asked about so follow-up phrases like
//! "blockers" or "all tasks" can be resolved without re-naming the subject.
//! Entries expire after a fixed TTL and are purged lazily before each
//! lookup. The clock is always passed in by the caller so tests stay
//! deterministic.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Default lifetime of a remembered subject.
pub const DEFAULT_CONTEXT_TTL_SECS: i64 = 3600;

/// One remembered subject for one user.
#[derive(Debug, Clone)]
pub struct ContextEntry {
    pub subject_person: String,
    pub created_at: DateTime<Utc>,
}

/// Process-wide, per-user conversation context store.
///
/// Concurrency-safe; the command gateway may touch it from many requests at
/// once.
#[derive(Debug)]
pub struct ContextStore {
    entries: DashMap<String, ContextEntry>,
    ttl: Duration,
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_CONTEXT_TTL_SECS))
    }
}

impl ContextStore {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Remember (or overwrite) the subject person for a user.
    pub fn remember(&self, user_id: &str, person: &str, now: DateTime<Utc>) {
        self.entries.insert(
            user_id.to_string(),
            ContextEntry {
                subject_person: person.to_string(),
                created_at: now,
            },
        );
    }

    /// Look up the live subject for a user. Expired entries are purged
    /// first and never returned.
    pub fn recall(&self, user_id: &str, now: DateTime<Utc>) -> Option<String> {
        self.purge_expired(now);
        self.entries.get(user_id).map(|e| e.subject_person.clone())
    }

    /// Drop every entry older than the TTL.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.created_at < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
