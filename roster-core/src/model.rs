//! Roster records as the store hands them out

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Teacher record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Student record
///
/// `is_active` only ever goes from true to false (suspension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
