//! API Module
//!
//! HTTP handlers and routing for the gateway REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /metrics` - Prometheus metrics
//! - `/api/v1/upload/*` - Upload bookkeeping
//! - `/api/v1/jobs/*` - Job tracking
//! - `/api/v1/cache/:key` - Generic cache
//! - `/api/v1/{compress,resize-image,convert-format}` - Placeholders

pub mod cache;
pub mod extract;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod upload;
pub mod utility;

pub use handlers::{health_handler, metrics_handler, AppState};
pub use routes::create_router;
