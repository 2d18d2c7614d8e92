//! Schema migrations for the roster tables

use sqlx::PgPool;

/// Create the teacher, student and association tables if missing.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running roster migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teachers (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teacher_students (
            teacher_id BIGINT NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
            student_id BIGINT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (teacher_id, student_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // reverse lookups: a student's teachers
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_teacher_students_student ON teacher_students(student_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Roster migrations complete");
    Ok(())
}
