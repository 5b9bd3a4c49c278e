//! Account routes
//!
//! Signup and login. Login answers with an empty success envelope and a
//! `Set-Cookie` header for the new session.

use super::ApiJson;
use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use blog_shared::{Envelope, LoginRequest, SignupRequest, UserData};

/// Create account routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
}

/// POST /api/v1/users/signup
///
/// Responds 201 with the new user; the password hash is never included.
async fn sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<UserData>>)> {
    let validate = !state.compat_mode();
    let user = AuthService::sign_up(state.users(), state.passwords(), req, validate).await?;

    Ok((StatusCode::CREATED, Json(Envelope::success(UserData { user }))))
}

/// POST /api/v1/users/login
async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let cookie = AuthService::login(state.users(), state.sessions(), state.cookies(), req).await?;

    Ok(([(SET_COOKIE, cookie)], Json(Envelope::<()>::empty())))
}
