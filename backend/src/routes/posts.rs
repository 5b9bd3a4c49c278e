//! Post routes
//!
//! In compatibility mode a missing post is reported as `"post": null` with
//! a 200, and deleting a missing post still succeeds. Otherwise both are 404.

use super::ApiJson;
use crate::auth::WriteAccess;
use crate::error::{ApiError, ApiResult};
use crate::services::PostService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use blog_shared::{Envelope, Post, PostData, PostsData};
use serde_json::Value;
use tracing::debug;

/// Create post routes
pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route(
            "/:id",
            get(get_post)
                .patch(update_post)
                .put(update_post)
                .delete(delete_post),
        )
}

/// Apply the not-found policy to an optional post
fn found(state: &AppState, post: Option<Post>) -> ApiResult<Option<Post>> {
    match post {
        None if !state.compat_mode() => Err(ApiError::NotFound("post not found".to_string())),
        post => Ok(post),
    }
}

/// GET /api/v1/posts
async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Envelope<PostsData>>> {
    let posts = PostService::list(state.posts()).await?;

    Ok(Json(Envelope::success_with_results(
        posts.len(),
        PostsData { posts },
    )))
}

/// GET /api/v1/posts/:id
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<PostData>>> {
    let post = PostService::get(state.posts(), &id).await?;
    let post = found(&state, post)?;

    Ok(Json(Envelope::success(PostData { post })))
}

/// POST /api/v1/posts
async fn create_post(
    State(state): State<AppState>,
    WriteAccess(author): WriteAccess,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Envelope<PostData>>> {
    if let Some(author) = &author {
        debug!(user_id = %author.user_id, "Post created by session user");
    }
    let post = PostService::create(state.posts(), body).await?;

    Ok(Json(Envelope::success(PostData { post: Some(post) })))
}

/// PATCH|PUT /api/v1/posts/:id
async fn update_post(
    State(state): State<AppState>,
    WriteAccess(_): WriteAccess,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<Envelope<PostData>>> {
    let post = PostService::update(state.posts(), &id, body).await?;
    let post = found(&state, post)?;

    Ok(Json(Envelope::success(PostData { post })))
}

/// DELETE /api/v1/posts/:id
async fn delete_post(
    State(state): State<AppState>,
    WriteAccess(_): WriteAccess,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope>> {
    let deleted = PostService::delete(state.posts(), &id).await?;
    if !deleted && !state.compat_mode() {
        return Err(ApiError::NotFound("post not found".to_string()));
    }

    Ok(Json(Envelope::empty()))
}
