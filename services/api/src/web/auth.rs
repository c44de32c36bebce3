//! services/api/src/web/auth.rs
//!
//! The lock screen endpoint for clients that unlock over plain HTTP.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use gakbbul_core::ui::dashboard::APP_PASSWORD_ERROR;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::web::session::{session_cookie, session_id_from_headers, SessionRegistry};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct UnlockRequest {
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UnlockResponse {
    pub unlocked: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/unlock - Pass the application lock screen for this browser session
#[utoipa::path(
    post,
    path = "/auth/unlock",
    request_body = UnlockRequest,
    responses(
        (status = 200, description = "Unlocked; the session cookie is set", body = UnlockResponse),
        (status = 401, description = "Wrong password")
    )
)]
pub async fn unlock_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UnlockRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Compare with the application secret
    if req.password != state.config.app_password {
        warn!("Rejected application unlock attempt.");
        return Err((StatusCode::UNAUTHORIZED, APP_PASSWORD_ERROR.to_string()));
    }

    // 2. Reuse the browser's session id, or start a new session
    let session_id =
        session_id_from_headers(&headers).unwrap_or_else(SessionRegistry::new_session_id);

    // 3. Persist the flag for the rest of the browser session
    state.sessions.mark_unlocked(&session_id).await;
    info!("Dashboard unlocked for session: {}", session_id);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&session_id))],
        Json(UnlockResponse { unlocked: true }),
    ))
}
