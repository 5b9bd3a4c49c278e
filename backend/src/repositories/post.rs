//! Post repository for database operations
//!
//! Post bodies live in a single JSONB column; updates merge the patch into
//! the stored object with `||`, which replaces top-level keys only.

use super::{PostRepository, RepositoryResult};
use async_trait::async_trait;
use blog_shared::{Document, Post};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Post row from database
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    doc: Json<Document>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post::new(row.id, row.doc.0)
    }
}

/// PostgreSQL-backed post repository
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, doc
            FROM posts
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, doc
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn create(&self, doc: Document) -> RepositoryResult<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, doc)
            VALUES ($1, $2)
            RETURNING id, doc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(Json(&doc))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, patch: Document) -> RepositoryResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET doc = doc || $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, doc
            "#,
        )
        .bind(id)
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
