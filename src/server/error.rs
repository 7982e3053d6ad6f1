// ABOUTME: Maps core errors onto JSON error responses for the dashboard API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use crate::sites::SiteError;

/// API-facing error: a status code plus a message, serialized as
/// `{"error": message}`. Never a raw stack trace.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// The engine could not be reached or answered garbage. Distinct from
    /// "no containers matched" so the dashboard can show that something is
    /// wrong with the engine itself.
    Upstream(String),
    Internal(String),
}

impl ApiError {
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<SiteError> for ApiError {
    fn from(err: SiteError) -> Self {
        let message = err.to_string();
        match err {
            SiteError::InvalidName(_) | SiteError::ReservedName(_) => Self::BadRequest(message),
            SiteError::AlreadyExists(_) => Self::Conflict(message),
            SiteError::NotFound(_) => Self::NotFound(message),
            SiteError::Engine(_) => Self::Upstream(message),
            SiteError::Io(_) | SiteError::CommandFailed { .. } => Self::Internal(message),
        }
    }
}
