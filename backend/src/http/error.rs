//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::engine::EditError;
use crate::models::StaffError;
use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Conflicts with in-flight work or current state
    Conflict(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => {
                let mut error = ApiError::new("REPOSITORY_ERROR", e.to_string());
                if let Some(operation) = &e.context().operation {
                    error = error.with_details(format!(
                        "operation: {} (retryable: {})",
                        operation,
                        e.is_retryable()
                    ));
                }
                (StatusCode::INTERNAL_SERVER_ERROR, error)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Request(e) => AppError::BadRequest(e.to_string()),
            ServiceError::Staff(e @ StaffError::InvalidStaffMember(_)) => {
                AppError::BadRequest(e.to_string())
            }
            ServiceError::Staff(e @ StaffError::StaffNotFound(_)) => {
                AppError::NotFound(e.to_string())
            }
            ServiceError::Edit(
                e @ (EditError::NoClassSelected | EditError::CoordinateOutOfRange { .. }),
            ) => AppError::BadRequest(e.to_string()),
            ServiceError::Edit(e @ EditError::UnknownClass(_)) => AppError::NotFound(e.to_string()),
            ServiceError::Edit(e @ EditError::StaleStaffReference(_)) => {
                AppError::Conflict(e.to_string())
            }
            e @ ServiceError::GenerationInProgress(_) => AppError::Conflict(e.to_string()),
            e @ ServiceError::ClassNotFound(_) => AppError::NotFound(e.to_string()),
            ServiceError::Repository(e) => AppError::Repository(e),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RequestError;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_service_error_status_codes() {
        assert_eq!(
            status_of(ServiceError::Request(RequestError::EmptyRoster)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::Edit(EditError::StaleStaffReference("x".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ServiceError::Edit(EditError::CoordinateOutOfRange {
                day: usize::MAX,
                period: 0,
                slot: 0,
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::GenerationInProgress("Class 1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ServiceError::ClassNotFound("Class 9".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::Repository(RepositoryError::storage("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
