//! OpenAPI document generated from the route annotations

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use roster_core::schema::{NotificationInput, RegisterInput, SuspendInput};

use super::error::MessageBody;
use super::routes::{health, notifications, register, students};
use super::server::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Student management API",
        description = "Apis to manage student accounts"
    ),
    paths(
        register::register,
        students::common_students,
        students::suspend,
        notifications::retrieve_for_notifications,
        health::health,
    ),
    components(schemas(
        RegisterInput,
        SuspendInput,
        NotificationInput,
        students::CommonStudentsResponse,
        notifications::RecipientsResponse,
        health::HealthResponse,
        MessageBody,
    )),
    tags(
        (name = "Registration", description = "Register students to a teacher"),
        (name = "User Management", description = "Query, suspend and notify students"),
        (name = "Operations", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// GET /api-docs
async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Docs routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api-docs", get(openapi))
}
