//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing and per-request timeout
//! - Panic catching into the generic 500 body
//! - Graceful shutdown
//! - JSON error responses
//! - gzip compression and an OpenAPI document

pub mod docs;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{router, run_server, AppState, ServerError};
