//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error responses so every
//! endpoint fails the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use meetgrid_core::errors::MeetgridError;

/// Application error wrapper that provides HTTP status code mapping.
///
/// Wraps a [`MeetgridError`] and implements `IntoResponse`, so handlers can
/// return `Result<_, AppError>` and use `?` on anything convertible into the
/// domain error.
#[derive(Debug)]
pub struct AppError(pub MeetgridError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            MeetgridError::EventNotFound(_)
            | MeetgridError::ParticipantNotFound(_)
            | MeetgridError::BookingNotFound(_) => StatusCode::NOT_FOUND,
            MeetgridError::InvalidRange { .. }
            | MeetgridError::OutOfBounds { .. }
            | MeetgridError::CorruptGrid(_)
            | MeetgridError::ShapeMismatch { .. }
            | MeetgridError::IncompleteClaim(_)
            | MeetgridError::Validation(_) => StatusCode::BAD_REQUEST,
            MeetgridError::SelfBooking(_) => StatusCode::FORBIDDEN,
            MeetgridError::SlotNotFree { .. }
            | MeetgridError::Conflict(_)
            | MeetgridError::DuplicateKey(_) => StatusCode::CONFLICT,
            MeetgridError::Provisioning(_) => StatusCode::BAD_GATEWAY,
            MeetgridError::PartialCommit { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            MeetgridError::Database(_) | MeetgridError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Get the error message and format as JSON
        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Allows `?` on functions returning `Result<T, MeetgridError>`.
impl From<MeetgridError> for AppError {
    fn from(err: MeetgridError) -> Self {
        AppError(err)
    }
}

/// Allows `?` on repository functions returning `Result<T, eyre::Report>`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(MeetgridError::Database(err))
    }
}
