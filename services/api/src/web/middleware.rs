//! services/api/src/web/middleware.rs
//!
//! Lock-screen middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::session::session_id_from_headers;
use crate::web::state::AppState;

/// Middleware that only lets requests from unlocked browser sessions through.
///
/// If the session cookie is missing or was never unlocked, returns 401 Unauthorized.
pub async fn require_unlocked(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract the session id from the cookie
    let session_id = session_id_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Check the unlock flag
    if !state.sessions.is_unlocked(&session_id).await {
        debug!("Request from locked session {}", session_id);
        return Err(StatusCode::UNAUTHORIZED);
    }

    // 3. Continue to the handler
    Ok(next.run(req).await)
}
