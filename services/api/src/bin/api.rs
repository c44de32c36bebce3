//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, MemorySiteRepository, OpenAiDescriptionAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use gakbbul_core::description::DisabledDescriptionService;
use gakbbul_core::ports::{DescriptionGenerationService, SiteRepository};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Site Store ---
    let repository: Arc<dyn SiteRepository> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            warn!("DATABASE_URL is not set; sites are kept in memory and lost on restart.");
            Arc::new(MemorySiteRepository::new())
        }
    };

    // --- 3. Initialize the Description Adapter ---
    let description_service: Arc<dyn DescriptionGenerationService> =
        match &config.description_api_key {
            Some(api_key) => {
                let openai_config = OpenAIConfig::new()
                    .with_api_base(&config.description_api_base)
                    .with_api_key(api_key);
                let client = Client::with_config(openai_config);
                Arc::new(OpenAiDescriptionAdapter::new(
                    client,
                    config.description_model.clone(),
                ))
            }
            None => {
                warn!("No GEMINI_API_KEY or OPENAI_API_KEY; AI descriptions will use the fallback text.");
                Arc::new(DisabledDescriptionService)
            }
        };

    // --- 4. Build the Shared AppState and the Router ---
    let app_state = Arc::new(AppState::new(repository, description_service, config.clone()));
    let app = build_router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
