//! KV Gateway - HTTP façade over a key-value store
//!
//! Upload bookkeeping, job tracking and a generic cache, backed by Redis or
//! an in-memory store, with Prometheus request metrics.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
