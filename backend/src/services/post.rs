//! Post service
//!
//! One store call per operation. Missing posts come back as `None`; the
//! router decides whether that is a `null` payload or a 404.

use crate::error::ApiError;
use crate::repositories::PostRepository;
use blog_shared::validation::{as_document, strip_reserved_keys, validate_post_document, WriteMode};
use blog_shared::{Document, Post};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

/// Post service for document operations
pub struct PostService;

impl PostService {
    /// Parse a path id; malformed ids are a validation failure
    pub fn parse_id(id: &str) -> Result<Uuid, ApiError> {
        Uuid::parse_str(id).map_err(|_| ApiError::Validation(format!("invalid post id '{}'", id)))
    }

    pub async fn list(posts: &dyn PostRepository) -> Result<Vec<Post>, ApiError> {
        Ok(posts.list().await?)
    }

    pub async fn get(posts: &dyn PostRepository, id: &str) -> Result<Option<Post>, ApiError> {
        let id = Self::parse_id(id)?;
        Ok(posts.find_by_id(id).await?)
    }

    /// Persist a new post from an arbitrary JSON object
    pub async fn create(posts: &dyn PostRepository, body: Value) -> Result<Post, ApiError> {
        debug!(body = %body, "Creating post");

        let doc = Self::prepare(body, WriteMode::Create)?;
        posts.create(doc).await.map_err(|e| {
            error!("Failed to create post: {}", e);
            ApiError::from(e)
        })
    }

    /// Merge a partial object into an existing post
    pub async fn update(
        posts: &dyn PostRepository,
        id: &str,
        body: Value,
    ) -> Result<Option<Post>, ApiError> {
        let id = Self::parse_id(id)?;
        let patch = Self::prepare(body, WriteMode::Update)?;
        Ok(posts.update(id, patch).await?)
    }

    /// Returns whether a post was removed
    pub async fn delete(posts: &dyn PostRepository, id: &str) -> Result<bool, ApiError> {
        let id = Self::parse_id(id)?;
        Ok(posts.delete(id).await?)
    }

    fn prepare(body: Value, mode: WriteMode) -> Result<Document, ApiError> {
        let mut doc = as_document(body)?;
        strip_reserved_keys(&mut doc);
        validate_post_document(&doc, mode)?;
        Ok(doc)
    }
}
