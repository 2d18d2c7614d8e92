//! roster-server: HTTP surface and PostgreSQL store for the roster
//!
//! - `db`: sqlx pool, schema migrations, `PgStore`
//! - `http`: axum router, extractors, JSON error responses

pub mod db;
pub mod http;

pub use db::{connect_with_retry, create_pool, PgStore};
pub use sqlx::PgPool;
pub use http::{router, run_server, ApiError, AppState, ServerError};
