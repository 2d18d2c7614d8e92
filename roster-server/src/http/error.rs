//! API error types with IntoResponse
//!
//! Every error becomes `{"message": ...}`. Client errors carry their final
//! message; server faults are logged and answered with a generic one.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use roster_core::{RosterError, ValidationErrors};

const INVALID_INPUT: &str = "Invalid input format!";
const MALFORMED_BODY: &str = "Malformed json";
const INTERNAL: &str = "Internal server error";

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    #[schema(example = "Invalid input format!")]
    pub message: String,
}

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Schema validation failed (400)
    Validation(ValidationErrors),

    /// Body parsed but has the wrong shape (400)
    Shape { reason: String },

    /// Body could not be parsed at all (400)
    Malformed { reason: String },

    /// Domain rule rejected the request (400)
    Rejected(RosterError),

    /// Unknown route (404)
    NotFound,

    /// Internal error (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(e) => {
                tracing::info!(problems = %e, "rejected invalid input");
                (StatusCode::BAD_REQUEST, INVALID_INPUT.to_owned())
            }
            Self::Shape { reason } => {
                tracing::info!(%reason, "rejected input of the wrong shape");
                (StatusCode::BAD_REQUEST, INVALID_INPUT.to_owned())
            }
            Self::Malformed { reason } => {
                tracing::info!(%reason, "rejected malformed body");
                (StatusCode::BAD_REQUEST, MALFORMED_BODY.to_owned())
            }
            Self::Rejected(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
            Self::Internal { message } => {
                // Log the actual error, return generic message
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned())
            }
        };

        (status, Json(MessageBody { message })).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<RosterError> for ApiError {
    fn from(e: RosterError) -> Self {
        if e.is_client_error() {
            Self::Rejected(e)
        } else {
            Self::Internal {
                message: e.to_string(),
            }
        }
    }
}
