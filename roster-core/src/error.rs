//! Domain and persistence error types

use thiserror::Error;

/// Failure reported by a `Store` implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("conflict: {what}")]
    Conflict { what: String },

    /// A record addressed by id no longer exists
    #[error("missing record: {what}")]
    Missing { what: String },

    /// Anything else the backend reports (connection, query, ...)
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict { what: what.into() }
    }

    pub fn missing(what: impl Into<String>) -> Self {
        Self::Missing { what: what.into() }
    }

    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Result of a roster operation
pub type Result<T> = std::result::Result<T, RosterError>;

/// Errors raised by the roster operations
///
/// Every variant except `Store` carries the final, caller-facing message.
#[derive(Error, Debug)]
pub enum RosterError {
    /// One or more students are already associated with the teacher
    #[error("Student(s) \"{}\" are already registered to the teacher", .emails.join(","))]
    AlreadyRegistered { emails: Vec<String> },

    /// One or more teacher emails do not resolve to a record
    #[error("Teacher(s) \"{}\" do not exist", .emails.join(","))]
    TeacherNotFound { emails: Vec<String> },

    /// The sender of a notification does not resolve to a record
    #[error("Teacher with this email does not exist")]
    SenderNotFound { email: String },

    /// Student email does not resolve to a record
    #[error("Student with this email does not exist")]
    StudentNotFound { email: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RosterError {
    /// Whether the caller can fix the request (as opposed to a server fault).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}
