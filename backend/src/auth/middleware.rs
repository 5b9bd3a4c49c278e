//! Session authentication
//!
//! [`resolve_session`] turns the signed session cookie into a
//! [`SessionUser`] via the session store. [`WriteAccess`] applies it to
//! post writes when protection is switched on.

use super::session::SessionRecord;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

const NOT_LOGGED_IN: &str = "not logged in";

/// User behind a live session
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub session_id: String,
    pub user_id: Uuid,
    pub username: String,
}

impl SessionUser {
    fn from_record(session_id: String, record: SessionRecord) -> Option<Self> {
        record.authenticated.then(|| Self {
            session_id,
            user_id: record.user_id,
            username: record.username,
        })
    }
}

/// Resolve the session cookie in `headers` to a logged-in user
pub async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionUser, ApiError> {
    let session_id = state
        .cookies()
        .session_id(headers)
        .ok_or_else(|| ApiError::Unauthorized(NOT_LOGGED_IN.to_string()))?;

    let record = state
        .sessions()
        .load(&session_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(NOT_LOGGED_IN.to_string()))?;

    SessionUser::from_record(session_id, record)
        .ok_or_else(|| ApiError::Unauthorized(NOT_LOGGED_IN.to_string()))
}

/// Gate for post writes
///
/// Resolves the session only when post protection is enabled; otherwise
/// every request passes with no user attached.
#[derive(Debug, Clone)]
pub struct WriteAccess(pub Option<SessionUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for WriteAccess
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        if !app_state.config().api.protect_posts {
            return Ok(WriteAccess(None));
        }
        resolve_session(&app_state, &parts.headers)
            .await
            .map(|user| WriteAccess(Some(user)))
    }
}
