//! Chat-facing task intelligence service.
//!
//! Wires the pure domain crate (`taskintel-core`) to the outside world:
//! the task-source HTTP client and fetcher, the TTL aggregation cache, the
//! webhook command gateway with its two-phase ack/deliver flow, and the
//! retrying callback delivery client.

pub mod cache;
pub mod delivery;
pub mod gateway;
pub mod pipeline;
pub mod source;

pub use cache::AggregationCache;
pub use delivery::DeliveryClient;
pub use gateway::{AppState, build_router};
pub use pipeline::CommandRequest;
