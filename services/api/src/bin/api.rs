//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, MemoryStorage, OpenAiStudyAdapter},
    config::Config,
    error::ApiError,
    web::{self, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use studyspark_core::ports::StorageService;
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

    // --- 2. Pick the Storage Backend ---
    let storage: Arc<dyn StorageService> = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await?;
            let db = DbAdapter::new(pool);
            info!("Running database migrations...");
            db.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db)
        }
        None => {
            warn!("DATABASE_URL is not set; data will be kept in memory and lost on restart");
            Arc::new(MemoryStorage::default())
        }
    };

    // --- 3. Initialize the AI Adapter ---
    let mut openai_config = OpenAIConfig::new().with_api_key(config.require_openai_api_key()?);
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url);
    }
    let ai = Arc::new(OpenAiStudyAdapter::new(
        Client::with_config(openai_config),
        config.ai_model.clone(),
    ));
    info!("Using model {}", config.ai_model);

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(storage, ai, config.clone()));
    let app = web::router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "OpenAPI document available at http://{}/api/openapi.json",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
