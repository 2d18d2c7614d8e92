//! Database layer - connection pool, migrations and the PostgreSQL store
//!
//! # Design Principles
//!
//! - Connection pool, no Arc<Mutex<Connection>>
//! - Find-or-create via ON CONFLICT, no check-then-insert
//! - Rely on the association primary key to catch racing registrations

pub mod migrations;
pub mod pool;
pub mod store;

pub use pool::{connect_with_retry, create_pool};
pub use store::PgStore;
