//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use divulge_core::error::{DomainError, PostError, RepoError};
use divulge_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
    Validation(Vec<String>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }

        HttpResponse::build(self.status_code()).json(self.problem())
    }
}

impl AppError {
    /// RFC 7807 body for this error. Internal details are never exposed.
    pub fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(_) => ErrorResponse::internal_error(),
            AppError::Validation(errors) => ErrorResponse::unprocessable(errors.join(", ")),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::Validation(vec![msg]),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::ValidationFailed(msg) => AppError::Validation(vec![msg]),
            PostError::NotFound(id)
            | PostError::MetadataWriteFailed {
                id,
                source: RepoError::NotFound,
                ..
            } => AppError::NotFound(format!("post {} not found", id)),
            err => AppError::Internal(err.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_post_errors_map_to_status_codes() {
        let id = Uuid::new_v4();

        let validation: AppError = PostError::ValidationFailed("missing title".into()).into();
        assert_eq!(validation.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing: AppError = PostError::NotFound(id).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let orphan: AppError = PostError::MetadataWriteFailed {
            op: "insert",
            id,
            orphaned_content: Some(format!("{id}.md")),
            source: RepoError::Connection("refused".into()),
        }
        .into();
        assert_eq!(orphan.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let unknown_update: AppError = PostError::MetadataWriteFailed {
            op: "update",
            id,
            orphaned_content: Some(format!("{id}.md")),
            source: RepoError::NotFound,
        }
        .into();
        assert_eq!(unknown_update.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_repo_constraint_is_conflict() {
        let err: AppError = RepoError::Constraint("email taken".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = AppError::Internal("secret connection string".into());
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.problem().detail.is_none());
    }
}
