use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Extension used for content blobs unless configured otherwise.
pub const DEFAULT_CONTENT_EXTENSION: &str = "md";

/// Derive the content store key for a post.
pub fn content_path(id: Uuid, extension: &str) -> String {
    format!("{id}.{extension}")
}

/// Lifecycle state of a stored post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostState {
    Draft,
    Published,
}

/// Post entity - a blog post whose body lives in the content store.
///
/// `id` is `None` until the post has been saved once. `content_path` is
/// assigned by the coordinator and never taken from callers; `content` is
/// carried alongside the metadata but is not persisted by the metadata store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Option<Uuid>,
    pub account_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub summary: String,
    #[serde(skip_deserializing)]
    pub content_path: Option<String>,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new, unsaved draft.
    pub fn new(
        account_id: Uuid,
        author_id: Uuid,
        title: impl Into<String>,
        summary: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            account_id,
            author_id,
            title: title.into(),
            summary: summary.into(),
            content_path: None,
            content: content.into(),
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn state(&self) -> PostState {
        match self.published_at {
            Some(_) => PostState::Published,
            None => PostState::Draft,
        }
    }

    /// Check the fields every saved post must carry.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.account_id.is_nil() {
            missing.push("accountId");
        }
        if self.author_id.is_nil() {
            missing.push("authorId");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}
