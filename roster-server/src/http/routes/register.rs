//! Registration endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Router};

use roster_core::schema::RegisterInput;

use crate::http::error::{ApiError, MessageBody};
use crate::http::extractors::ValidBody;
use crate::http::server::AppState;

/// POST /register - register students under a teacher
#[utoipa::path(
    post,
    path = "/register",
    tag = "Registration",
    request_body = RegisterInput,
    responses(
        (status = 204, description = "Student registration completed successfully"),
        (status = 400, description = "Invalid input, student already registered, or malformed json", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidBody(input): ValidBody<RegisterInput>,
) -> Result<StatusCode, ApiError> {
    let registration = input.validate()?;
    state
        .roster
        .register_students(&registration.teacher, &registration.students)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Registration routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/register", post(register))
}
