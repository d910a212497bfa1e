pub mod classifier;
pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod providers;
pub mod routes;
pub mod services;
pub mod storage;
pub mod vision;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::logging::Logger;
use crate::providers::AnthropicProvider;
use crate::routes::AppState;
use crate::services::{RecipeRecommender, TokenAuthService, TokenSigner, VisionDetectorService};
use crate::storage::SqliteStore;
use crate::vision::GoogleVisionDetector;

/// Wire the store, cloud clients and services described by `config`
pub async fn build_state(
    config: &AppConfig,
    logger: Logger,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let store = Arc::new(SqliteStore::connect(&config.database_url, logger.clone()).await?);

    let signer = TokenSigner::new(
        &config.auth.jwt_secret,
        chrono::Duration::hours(config.auth.token_lifetime_hours),
    );
    let auth = TokenAuthService::new(
        store.clone(),
        store.clone(),
        signer,
        config.auth.bcrypt_cost,
        logger.clone(),
    );

    let vision = GoogleVisionDetector::new(&config.vision, logger.clone())?;
    let detector = VisionDetectorService::new(
        Arc::new(vision),
        config.vision.custom_labels.clone(),
        logger.clone(),
    );

    let llm = AnthropicProvider::new(&config.llm, logger.clone())?;
    let recipes = RecipeRecommender::new(Arc::new(llm), store, logger.clone());

    Ok(AppState {
        auth: Arc::new(auth),
        detector: Arc::new(detector),
        recipes: Arc::new(recipes),
        logger,
    })
}
