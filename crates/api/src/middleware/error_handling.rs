//! # Error Handling Middleware
//!
//! Maps domain errors onto the wire contract the EduVate clients expect:
//! business-logic failures are still HTTP 200 with a
//! `{"success": false, "error": "..."}` envelope; clients branch on the
//! envelope, not the status code. Only infrastructure failures (database,
//! internal, transient upstream) surface as non-200 responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eduvate_core::errors::AuthError;
use serde_json::json;

/// Application error wrapper that provides the envelope mapping.
///
/// `AppError` wraps domain-specific `AuthError` instances and implements
/// `IntoResponse` to convert them into the JSON envelope with the
/// appropriate status code.
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Business-logic outcomes keep HTTP 200; only transport-level
        // failures use error statuses.
        let status = match &self.0 {
            AuthError::Validation(_)
            | AuthError::NotFound(_)
            | AuthError::Authentication(_)
            | AuthError::Authorization(_)
            | AuthError::StateConflict(_) => StatusCode::OK,
            AuthError::Transient(_) => StatusCode::BAD_GATEWAY,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        let body = Json(json!({ "success": false, "error": message }));

        (status, body).into_response()
    }
}

/// Allows using `?` with functions returning `Result<T, AuthError>` in
/// handlers that return `Result<T, AppError>`.
impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError(err)
    }
}

/// Allows using `?` with repository calls returning `eyre::Result`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(AuthError::Database(err))
    }
}
