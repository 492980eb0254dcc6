//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lifecycle::{DomainError, ErrorKind};
use queries::QueryError;
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unknown bearer token.
    Unauthorized(String),
    /// Malformed request from the client.
    BadRequest(String),
    /// The caller's role does not allow the route.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Lifecycle engine error.
    Domain(DomainError),
    /// Read-side query error.
    Query(QueryError),
    /// Internal server error.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    kind: &'a str,
    message: String,
}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorKind::Validation.as_str(), msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorKind::Forbidden.as_str(), msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorKind::NotFound.as_str(), msg),
            ApiError::Domain(err) => {
                let kind = err.kind();
                (status_for(kind), kind.as_str(), err.to_string())
            }
            ApiError::Query(err) => {
                let kind = match err {
                    QueryError::NoData(_) => ErrorKind::NotFound,
                    QueryError::Validation(_) => ErrorKind::Validation,
                    QueryError::Store(_) | QueryError::Collaborator(_) => ErrorKind::Internal,
                };
                (status_for(kind), kind.as_str(), err.to_string())
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Internal.as_str(),
                msg,
            ),
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::Upload => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %message, kind, "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail { kind, message },
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Query(err)
    }
}

impl From<collaborators::CollaboratorError> for ApiError {
    fn from(err: collaborators::CollaboratorError) -> Self {
        match err {
            collaborators::CollaboratorError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
