pub mod admin_task;
pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod state;
pub mod ws_handler;

use crate::error::ApiError;
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Re-export the handlers to make them easily accessible
// to the binary and the tests that build the web server router.
pub use auth::unlock_handler;
pub use middleware::require_unlocked;
pub use rest::{list_sites_handler, ApiDoc};
pub use state::AppState;
pub use ws_handler::ws_handler;

/// Builds the complete application router: lock screen, REST, WebSocket and Swagger UI.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Public routes (no unlock required)
    let public_routes = Router::new()
        .route("/auth/unlock", post(unlock_handler))
        .route("/ws", get(ws_handler));

    // Protected routes (unlocked session required)
    let protected_routes = Router::new()
        .route("/sites", get(list_sites_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_unlocked,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
