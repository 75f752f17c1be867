//! Core domain library for the task intelligence bot.
//!
//! Everything in this crate is pure and deterministic: the task model,
//! query-to-intent classification, per-user conversation context, filtering
//! and ordering, and report formatting. Network I/O (source fetching,
//! aggregation caching, the command gateway) lives in the `taskintel`
//! service crate on top of these types.

pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod format;
pub mod intent;
pub mod roster;
pub mod task;

pub use classify::Classifier;
pub use config::{DepartmentConfig, IntelConfig};
pub use context::ContextStore;
pub use error::{IntelError, Result};
pub use filter::{select, sort_tasks};
pub use format::Formatter;
pub use intent::{Intent, IntentKind, Timeframe};
pub use roster::Roster;
pub use task::Task;
