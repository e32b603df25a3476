//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business rule failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Content store errors.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content not found at {0}")]
    NotFound(String),

    #[error("Invalid content key: {0}")]
    InvalidKey(String),

    #[error("Content I/O failed: {0}")]
    Io(String),

    #[error("Content is corrupt: {0}")]
    Corrupt(String),
}

/// Errors surfaced by the post coordinator.
///
/// Every store failure keeps the underlying error as its `source` together
/// with the operation and identifier it happened on.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post validation failed: {0}")]
    ValidationFailed(String),

    #[error("Post {0} not found")]
    NotFound(Uuid),

    #[error("Failed to write content for post {id} at {path}: {source}")]
    ContentWriteFailed {
        id: Uuid,
        path: String,
        source: ContentError,
    },

    #[error("Failed to read content for post {id} at {path}: {source}")]
    ContentReadFailed {
        id: Uuid,
        path: String,
        source: ContentError,
    },

    /// When `orphaned_content` is set, the content blob at that path was
    /// written but no metadata row references it.
    #[error("Failed to {op} metadata for {id}: {source}")]
    MetadataWriteFailed {
        op: &'static str,
        id: Uuid,
        orphaned_content: Option<String>,
        source: RepoError,
    },

    #[error("Failed to {op} metadata for {id}: {source}")]
    MetadataReadFailed {
        op: &'static str,
        id: Uuid,
        source: RepoError,
    },

    #[error("Failed to delete metadata for post {id}: {source}")]
    MetadataDeleteFailed { id: Uuid, source: RepoError },
}

impl PostError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::NotFound(_))
    }

    /// True for errors the caller can fix by changing its input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PostError::ValidationFailed(_) | PostError::NotFound(_))
    }

    /// Path of a content blob left without a metadata row, if any.
    pub fn orphaned_content(&self) -> Option<&str> {
        match self {
            PostError::MetadataWriteFailed {
                orphaned_content, ..
            } => orphaned_content.as_deref(),
            _ => None,
        }
    }
}

impl From<DomainError> for PostError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { id, .. } => PostError::NotFound(id),
            DomainError::Validation(msg) => PostError::ValidationFailed(msg),
        }
    }
}
