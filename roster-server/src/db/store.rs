//! PostgreSQL implementation of the roster `Store`
//!
//! - find-or-create: INSERT with ON CONFLICT (idempotent, single query)
//! - add_associations: one INSERT over UNNEST, so the batch is atomic
//! - list reads: JOIN / GROUP BY filters, one query each (no N+1)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use roster_core::{Store, StoreError, Student, Teacher};

/// Shared column set of `teachers` and `students`
#[derive(Debug, Clone, FromRow)]
struct PersonRow {
    id: i64,
    email: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<PersonRow> for Teacher {
    fn from(r: PersonRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

impl From<PersonRow> for Student {
    fn from(r: PersonRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

fn store_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::conflict(db.message().to_owned());
        }
    }
    StoreError::backend(e)
}

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_teacher(&self, email: &str) -> Result<Option<Teacher>, StoreError> {
        let row: Option<PersonRow> = sqlx::query_as(
            "SELECT id, email, is_active, created_at FROM teachers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(Teacher::from))
    }

    async fn find_student(&self, email: &str) -> Result<Option<Student>, StoreError> {
        let row: Option<PersonRow> = sqlx::query_as(
            "SELECT id, email, is_active, created_at FROM students WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(Student::from))
    }

    async fn find_or_create_teacher(&self, email: &str) -> Result<Teacher, StoreError> {
        // DO UPDATE (not DO NOTHING) so RETURNING yields the existing row
        let row: PersonRow = sqlx::query_as(
            r#"
            INSERT INTO teachers (email) VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, is_active, created_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.into())
    }

    async fn find_or_create_student(&self, email: &str) -> Result<Student, StoreError> {
        let row: PersonRow = sqlx::query_as(
            r#"
            INSERT INTO students (email) VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, is_active, created_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.into())
    }

    async fn set_student_active(&self, student_id: i64, active: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE students SET is_active = $2, updated_at = NOW() WHERE id = $1")
            .bind(student_id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn has_association(
        &self,
        teacher_id: i64,
        student_id: i64,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM teacher_students
                WHERE teacher_id = $1 AND student_id = $2
            )
            "#,
        )
        .bind(teacher_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn add_associations(
        &self,
        teacher_id: i64,
        student_ids: &[i64],
    ) -> Result<(), StoreError> {
        if student_ids.is_empty() {
            return Ok(());
        }

        // single statement: an existing pair fails the whole batch
        sqlx::query(
            r#"
            INSERT INTO teacher_students (teacher_id, student_id)
            SELECT $1, UNNEST($2::BIGINT[])
            "#,
        )
        .bind(teacher_id)
        .bind(student_ids)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }

    async fn active_students_of(&self, teacher_id: i64) -> Result<Vec<Student>, StoreError> {
        let rows: Vec<PersonRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.email, s.is_active, s.created_at
            FROM students s
            JOIN teacher_students ts ON ts.student_id = s.id
            WHERE ts.teacher_id = $1 AND s.is_active
            ORDER BY s.id
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn common_active_students(
        &self,
        teacher_ids: &[i64],
    ) -> Result<Vec<Student>, StoreError> {
        if teacher_ids.is_empty() {
            return Ok(Vec::new());
        }

        // a student qualifies when it matches every listed teacher
        let rows: Vec<PersonRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.email, s.is_active, s.created_at
            FROM students s
            JOIN teacher_students ts ON ts.student_id = s.id
            WHERE s.is_active AND ts.teacher_id = ANY($1)
            GROUP BY s.id
            HAVING COUNT(DISTINCT ts.teacher_id) = $2
            ORDER BY s.id
            "#,
        )
        .bind(teacher_ids)
        .bind(teacher_ids.len() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}
