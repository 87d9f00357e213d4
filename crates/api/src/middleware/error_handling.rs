//! # Error Handling Middleware
//!
//! Maps [`TimetableError`] to HTTP status codes and JSON error bodies so every
//! endpoint reports failures the same way:
//!
//! | Error            | Status |
//! |------------------|--------|
//! | `NotFound`       | 404    |
//! | `Validation`     | 400    |
//! | `InvalidRange`   | 400    |
//! | `Conflict`       | 409    |
//! | `Persistence`    | 500    |
//!
//! Bodies, query strings and path segments that fail to deserialize are
//! reported as `Validation` through the rejection conversions below.
//!
//! A conflict body carries the structured conflicts next to the message.
//! Persistence details are logged and never sent to the client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use timetable_core::errors::TimetableError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use timetable_api::middleware::error_handling::AppError;
/// use timetable_core::errors::TimetableError;
///
/// async fn handler(id: u32) -> Result<Json<u32>, AppError> {
///     if id == 0 {
///         return Err(AppError(TimetableError::NotFound("slot 0".into())));
///     }
///     Ok(Json(id))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub TimetableError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TimetableError::NotFound(_) => StatusCode::NOT_FOUND,
            TimetableError::Validation(_) | TimetableError::InvalidRange(_) => {
                StatusCode::BAD_REQUEST
            }
            TimetableError::Conflict(_) => StatusCode::CONFLICT,
            TimetableError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = self.0.to_string();
        let body = match &self.0 {
            TimetableError::Conflict(report) => json!({
                "error": message,
                "conflicts": report.conflicts,
            }),
            TimetableError::Persistence(report) => {
                error!(error = ?report, "Request failed on persistence error");
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<TimetableError> for AppError {
    fn from(err: TimetableError) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(TimetableError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(TimetableError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(TimetableError::Validation(rejection.body_text()))
    }
}

/// Maps a TimetableError straight to an HTTP response
pub fn map_error(err: TimetableError) -> Response {
    AppError(err).into_response()
}
