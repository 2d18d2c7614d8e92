//! Notification recipient endpoint

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use roster_core::schema::NotificationInput;

use crate::http::error::{ApiError, MessageBody};
use crate::http::extractors::ValidBody;
use crate::http::server::AppState;

/// Recipients response
#[derive(Serialize, ToSchema)]
pub struct RecipientsResponse {
    pub recipients: Vec<String>,
}

/// POST /retrievefornotifications - who receives a teacher's notification
#[utoipa::path(
    post,
    path = "/retrievefornotifications",
    tag = "User Management",
    request_body = NotificationInput,
    responses(
        (status = 200, description = "Active students of the teacher plus active mentioned students", body = RecipientsResponse),
        (status = 400, description = "Invalid input, unknown teacher, or malformed json", body = MessageBody),
        (status = 500, description = "Internal server error", body = MessageBody),
    )
)]
pub async fn retrieve_for_notifications(
    State(state): State<Arc<AppState>>,
    ValidBody(input): ValidBody<NotificationInput>,
) -> Result<Json<RecipientsResponse>, ApiError> {
    let notification = input.validate()?;
    let recipients = state
        .roster
        .notification_recipients(&notification.teacher, &notification.text)
        .await?;

    Ok(Json(RecipientsResponse { recipients }))
}

/// Notification routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/retrievefornotifications", post(retrieve_for_notifications))
}
