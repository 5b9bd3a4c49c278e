//! Compatibility rendering of failures
//!
//! With `api.compat_mode` on, every failed response is rewritten to
//! `400 {"status":"failed"}`. Only login credential messages survive.

use crate::error::Failure;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use blog_shared::Envelope;

/// Flatten tagged failures into the legacy response shape
pub async fn flatten_failures(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.compat_mode() {
        return response;
    }

    match response.extensions().get::<Failure>() {
        Some(failure) => {
            let message = failure
                .kind
                .keeps_message_when_flattened()
                .then(|| failure.message.clone());
            (StatusCode::BAD_REQUEST, Json(Envelope::<()>::failed(message))).into_response()
        }
        None => response,
    }
}
