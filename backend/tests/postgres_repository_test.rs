//! PostgreSQL repository tests
//!
//! Run with: cargo test --features integration -- --ignored
//! The database comes from the usual configuration (BLOG__DATABASE__*).

#![cfg(feature = "integration")]

mod common;

use blog_backend::config::AppConfig;
use blog_backend::db;
use blog_backend::error::ApiError;
use blog_backend::repositories::{
    PgPostRepository, PgUserRepository, PostRepository, RepositoryError, UserRepository,
};
use blog_shared::{Document, ErrorKind};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> PgPool {
    let config = AppConfig::load().expect("configuration loads");
    let pool = db::create_pool(&config.database)
        .await
        .expect("database reachable");
    db::run_migrations(&pool).await.expect("migrations apply");
    pool
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_username_is_conflict() {
    let users = PgUserRepository::new(pool().await);
    let username = common::random_username();

    let created = users.create(&username, "hash").await.unwrap();
    let err = users.create(&username, "other").await.unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(ApiError::from(err).kind(), ErrorKind::Conflict);

    let found = users.find_by_username(&username).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash, "hash");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_unknown_username_is_none() {
    let users = PgUserRepository::new(pool().await);

    let found = users
        .find_by_username(&common::random_username())
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_merges_top_level_keys() {
    let posts = PgPostRepository::new(pool().await);
    let post = posts
        .create(doc(json!({ "title": "t", "body": "b", "tags": ["a"] })))
        .await
        .unwrap();

    let updated = posts
        .update(post.id, doc(json!({ "body": "c", "views": 3 })))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.get("title"), Some(&json!("t")));
    assert_eq!(updated.get("body"), Some(&json!("c")));
    assert_eq!(updated.get("tags"), Some(&json!(["a"])));
    assert_eq!(updated.get("views"), Some(&json!(3)));

    let reloaded = posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(reloaded, updated);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_missing_post_is_none() {
    let posts = PgPostRepository::new(pool().await);

    let updated = posts
        .update(Uuid::new_v4(), doc(json!({ "body": "c" })))
        .await
        .unwrap();

    assert!(updated.is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_reports_whether_a_row_was_removed() {
    let posts = PgPostRepository::new(pool().await);
    let post = posts
        .create(doc(json!({ "title": "t", "body": "b" })))
        .await
        .unwrap();

    assert!(posts.delete(post.id).await.unwrap());
    assert!(!posts.delete(post.id).await.unwrap());
    assert!(posts.find_by_id(post.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_list_is_in_creation_order() {
    let posts = PgPostRepository::new(pool().await);
    let first = posts
        .create(doc(json!({ "title": "first", "body": "1" })))
        .await
        .unwrap();
    let second = posts
        .create(doc(json!({ "title": "second", "body": "2" })))
        .await
        .unwrap();

    let ids: Vec<Uuid> = posts.list().await.unwrap().iter().map(|p| p.id).collect();
    let first_at = ids.iter().position(|id| *id == first.id).unwrap();
    let second_at = ids.iter().position(|id| *id == second.id).unwrap();

    assert!(first_at < second_at);
}
