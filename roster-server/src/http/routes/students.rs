//! Student query and suspension endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use roster_core::schema::SuspendInput;

use crate::http::error::{ApiError, MessageBody};
use crate::http::extractors::{TeacherQuery, ValidBody};
use crate::http::server::AppState;

/// Common students response
#[derive(Serialize, ToSchema)]
pub struct CommonStudentsResponse {
    pub students: Vec<String>,
}

/// GET /commonstudents?teacher=..&teacher=.. - students shared by every teacher
#[utoipa::path(
    get,
    path = "/commonstudents",
    tag = "User Management",
    params(
        ("teacher" = Vec<String>, Query, description = "Teacher email, repeatable (`teacher[]` also accepted)"),
    ),
    responses(
        (status = 200, description = "Active students registered to every teacher", body = CommonStudentsResponse),
        (status = 400, description = "Invalid input or unknown teacher", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody),
    )
)]
pub async fn common_students(
    State(state): State<Arc<AppState>>,
    TeacherQuery(query): TeacherQuery,
) -> Result<Json<CommonStudentsResponse>, ApiError> {
    let teachers = query.validate()?;
    let students = state.roster.common_students(&teachers).await?;

    Ok(Json(CommonStudentsResponse { students }))
}

/// POST /suspend - suspend a student
#[utoipa::path(
    post,
    path = "/suspend",
    tag = "User Management",
    request_body = SuspendInput,
    responses(
        (status = 204, description = "Student account suspended successfully"),
        (status = 400, description = "Invalid input, unknown student, or malformed json", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody),
    )
)]
pub async fn suspend(
    State(state): State<Arc<AppState>>,
    ValidBody(input): ValidBody<SuspendInput>,
) -> Result<StatusCode, ApiError> {
    let student = input.validate()?;
    state.roster.suspend_student(&student).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Student routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/commonstudents", get(common_students))
        .route("/suspend", post(suspend))
}
