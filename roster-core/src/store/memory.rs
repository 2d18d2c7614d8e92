//! In-memory store
//!
//! Backs `roster serve --memory` and the service tests. All tables sit
//! behind one `RwLock`, so every call is atomic with respect to the others.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Store;
use crate::error::StoreError;
use crate::model::{Student, Teacher};

#[derive(Default)]
struct Tables {
    teachers: BTreeMap<i64, Teacher>,
    students: BTreeMap<i64, Student>,
    teacher_by_email: HashMap<String, i64>,
    student_by_email: HashMap<String, i64>,
    /// (teacher_id, student_id)
    enrollments: BTreeSet<(i64, i64)>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store keeping every table in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_teacher(&self, email: &str) -> Result<Option<Teacher>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .teacher_by_email
            .get(email)
            .and_then(|id| tables.teachers.get(id))
            .cloned())
    }

    async fn find_student(&self, email: &str) -> Result<Option<Student>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .student_by_email
            .get(email)
            .and_then(|id| tables.students.get(id))
            .cloned())
    }

    async fn find_or_create_teacher(&self, email: &str) -> Result<Teacher, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(teacher) = tables
            .teacher_by_email
            .get(email)
            .and_then(|id| tables.teachers.get(id))
        {
            return Ok(teacher.clone());
        }

        let teacher = Teacher {
            id: tables.next_id(),
            email: email.to_owned(),
            is_active: true,
            created_at: Utc::now(),
        };
        tables.teacher_by_email.insert(teacher.email.clone(), teacher.id);
        tables.teachers.insert(teacher.id, teacher.clone());
        Ok(teacher)
    }

    async fn find_or_create_student(&self, email: &str) -> Result<Student, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(student) = tables
            .student_by_email
            .get(email)
            .and_then(|id| tables.students.get(id))
        {
            return Ok(student.clone());
        }

        let student = Student {
            id: tables.next_id(),
            email: email.to_owned(),
            is_active: true,
            created_at: Utc::now(),
        };
        tables.student_by_email.insert(student.email.clone(), student.id);
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn set_student_active(&self, student_id: i64, active: bool) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let student = tables
            .students
            .get_mut(&student_id)
            .ok_or_else(|| StoreError::missing(format!("student {}", student_id)))?;
        student.is_active = active;
        Ok(())
    }

    async fn has_association(
        &self,
        teacher_id: i64,
        student_id: i64,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.enrollments.contains(&(teacher_id, student_id)))
    }

    async fn add_associations(
        &self,
        teacher_id: i64,
        student_ids: &[i64],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = student_ids
            .iter()
            .find(|&&s| tables.enrollments.contains(&(teacher_id, s)))
        {
            return Err(StoreError::conflict(format!(
                "teacher {} already has student {}",
                teacher_id, existing
            )));
        }

        tables
            .enrollments
            .extend(student_ids.iter().map(|&s| (teacher_id, s)));
        Ok(())
    }

    async fn active_students_of(&self, teacher_id: i64) -> Result<Vec<Student>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .range((teacher_id, i64::MIN)..=(teacher_id, i64::MAX))
            .filter_map(|(_, s)| tables.students.get(s))
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    async fn common_active_students(
        &self,
        teacher_ids: &[i64],
    ) -> Result<Vec<Student>, StoreError> {
        if teacher_ids.is_empty() {
            return Ok(Vec::new());
        }

        let tables = self.tables.read().await;
        Ok(tables
            .students
            .values()
            .filter(|s| s.is_active)
            .filter(|s| {
                teacher_ids
                    .iter()
                    .all(|&t| tables.enrollments.contains(&(t, s.id)))
            })
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
