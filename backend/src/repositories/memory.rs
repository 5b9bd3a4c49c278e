//! In-process repositories for local development and tests

use super::{PostRepository, RepositoryError, RepositoryResult, UserRecord, UserRepository};
use async_trait::async_trait;
use blog_shared::{Document, Post};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// User repository held in memory; usernames are unique
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<UserRecord>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> RepositoryResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(RepositoryError::Conflict(format!(
                "username '{}' already exists",
                username
            )));
        }

        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }
}

/// Post repository held in memory, kept in insertion order
#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        Ok(self.posts.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, doc: Document) -> RepositoryResult<Post> {
        let post = Post::new(Uuid::new_v4(), doc);
        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, patch: Document) -> RepositoryResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        for (key, value) in patch {
            post.fields.insert(key, value);
        }
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }
}
