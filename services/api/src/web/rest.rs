//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::auth::{UnlockRequest, UnlockResponse};
use crate::web::protocol::SiteCardDto;
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use gakbbul_core::search::filter_sites;
use gakbbul_core::ui::SiteCard;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, OpenApi};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::unlock_handler,
        list_sites_handler,
    ),
    components(
        schemas(UnlockRequest, UnlockResponse, SiteCardDto)
    ),
    tags(
        (name = "GAKBBUL API", description = "Bookmark dashboard endpoints. The live dashboard runs over /ws.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Query Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring matched against title, name and description.
    #[serde(default)]
    pub q: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the saved sites, newest first, optionally filtered.
///
/// Requires a session that passed the lock screen.
#[utoipa::path(
    get,
    path = "/sites",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching site cards", body = [SiteCardDto]),
        (status = 401, description = "Session is locked"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_sites_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SiteCardDto>>, (StatusCode, String)> {
    // A one-shot read: take the first snapshot of a subscription, then release it.
    let mut subscription = app_state.repository.subscribe().await.map_err(|e| {
        error!("Failed to read sites: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to read sites".to_string(),
        )
    })?;
    let sites = subscription.next_snapshot().await.unwrap_or_default();
    subscription.cancel();

    let cards = filter_sites(&sites, &params.q)
        .into_iter()
        .map(|site| SiteCardDto::from(SiteCard::from_site(site)))
        .collect();
    Ok(Json(cards))
}
