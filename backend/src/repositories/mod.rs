//! Document store repositories
//!
//! Services only see the [`UserRepository`] and [`PostRepository`] traits.
//! The PostgreSQL implementations keep post bodies in a JSONB column; the
//! in-memory ones back local development and tests.

pub mod memory;
pub mod post;
pub mod user;

use async_trait::async_trait;
use blog_shared::{Document, Post};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use memory::{MemoryPostRepository, MemoryUserRepository};
pub use post::PgPostRepository;
pub use user::{PgUserRepository, UserRecord};

/// Failure reported by a document store
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken username is a [`RepositoryError::Conflict`]
    async fn create(&self, username: &str, password_hash: &str) -> RepositoryResult<UserRecord>;

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>>;
}

/// Persistence for free-form post documents
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts in creation order
    async fn list(&self) -> RepositoryResult<Vec<Post>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Post>>;

    /// Persist a new document under a fresh id
    async fn create(&self, doc: Document) -> RepositoryResult<Post>;

    /// Merge `patch` into the stored document, returning the new state
    async fn update(&self, id: Uuid, patch: Document) -> RepositoryResult<Option<Post>>;

    /// Returns whether a post was removed
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

/// Handles to the document store, built once at startup
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pool: Option<PgPool>,
}

impl Repositories {
    /// Repositories backed by a PostgreSQL pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Repositories kept in process memory
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            posts: Arc::new(MemoryPostRepository::default()),
            pool: None,
        }
    }

    /// Check that the underlying store answers
    pub async fn health_check(&self) -> anyhow::Result<()> {
        match &self.pool {
            Some(pool) => crate::db::health_check(pool).await,
            None => Ok(()),
        }
    }

    /// Release store connections
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
