//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::session::SessionRegistry;
use gakbbul_core::description::DescriptionGenerator;
use gakbbul_core::ports::{DescriptionGenerationService, SiteRepository};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn SiteRepository>,
    pub describer: DescriptionGenerator,
    pub config: Arc<Config>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn SiteRepository>,
        description_service: Arc<dyn DescriptionGenerationService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            repository,
            describer: DescriptionGenerator::new(description_service),
            config,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
