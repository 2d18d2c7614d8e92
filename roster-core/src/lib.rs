//! roster-core: teacher/student roster domain
//!
//! Records, validated input schemas, the `@mention` parser, the persistence
//! contract every store implements, and the `Roster` service that runs the
//! registration, common-students, suspension and notification operations.

pub mod config;
pub mod email;
pub mod error;
pub mod mentions;
pub mod model;
pub mod schema;
pub mod service;
pub mod store;

pub use config::RosterConfig;
pub use email::Email;
pub use error::{RosterError, StoreError};
pub use mentions::parse_mentions;
pub use model::{Student, Teacher};
pub use schema::{FieldProblem, ValidationErrors};
pub use service::Roster;
pub use store::{MemoryStore, Store};
