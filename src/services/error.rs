//! Error handling utilities for route handlers
//!
//! Every error leaves the server as the uniform JSON envelope
//! `{"success": false, "message": "..."}` with an HTTP status. Internal
//! causes (database, storage, upstream APIs) are logged server-side and
//! replaced with a generic message so nothing leaks to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Log the cause with context and return a generic 500.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        eprintln!("{}: {}", context, err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

/// True when a sqlx error is a Postgres unique-constraint violation
/// (SQLSTATE 23505). Identity conflicts that slip past a pre-check and
/// hit the unique index report as 409, not 500.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Extension trait for logging errors and converting to ApiError
pub trait LogErr<T> {
    /// Log error with context and return a generic 500 envelope
    fn or_500(self, context: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn or_500(self, context: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::internal(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_map_statuses() {
        assert_eq!(ApiError::bad_request("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("x").status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_hides_cause() {
        let err = ApiError::internal("db", "connection refused to 10.0.0.5");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Server error");
    }

    #[test]
    fn test_or_500_passes_ok_through() {
        let ok: Result<i32, String> = Ok(7);
        assert_eq!(ok.or_500("ctx").unwrap(), 7);
    }
}
