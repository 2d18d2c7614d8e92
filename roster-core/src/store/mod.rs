//! Persistence contract for the roster
//!
//! The domain never holds on to a live row: every call names the records it
//! touches by email or id, and implementations handle all storage details.
//!
//! # Design Rules
//!
//! - No backend types (`sqlx`, ...) in signatures
//! - Find-or-create is a single idempotent call, never check-then-insert
//! - `add_associations` is all-or-nothing and reports an existing pair as
//!   `StoreError::Conflict`

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Student, Teacher};

#[async_trait]
pub trait Store: Send + Sync {
    /// Look up a teacher by exact email.
    async fn find_teacher(&self, email: &str) -> Result<Option<Teacher>, StoreError>;

    /// Look up a student by exact email, active or suspended.
    async fn find_student(&self, email: &str) -> Result<Option<Student>, StoreError>;

    /// Return the teacher with this email, inserting it if absent.
    async fn find_or_create_teacher(&self, email: &str) -> Result<Teacher, StoreError>;

    /// Return the student with this email, inserting it (active) if absent.
    async fn find_or_create_student(&self, email: &str) -> Result<Student, StoreError>;

    /// Update a student's active flag.
    async fn set_student_active(&self, student_id: i64, active: bool) -> Result<(), StoreError>;

    /// Whether the (teacher, student) pair is associated.
    async fn has_association(&self, teacher_id: i64, student_id: i64)
        -> Result<bool, StoreError>;

    /// Associate every student with the teacher in one batch.
    ///
    /// If any pair already exists nothing is written and
    /// `StoreError::Conflict` is returned.
    async fn add_associations(&self, teacher_id: i64, student_ids: &[i64])
        -> Result<(), StoreError>;

    /// Active students associated with the teacher.
    async fn active_students_of(&self, teacher_id: i64) -> Result<Vec<Student>, StoreError>;

    /// Active students associated with every one of the teachers.
    ///
    /// `teacher_ids` holds no duplicates; an empty slice yields nothing.
    async fn common_active_students(&self, teacher_ids: &[i64])
        -> Result<Vec<Student>, StoreError>;

    /// Cheap round trip proving the backend answers.
    async fn ping(&self) -> Result<(), StoreError>;
}
