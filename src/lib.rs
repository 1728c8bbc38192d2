pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::{DbWordSource, PersistentTier, RedisCache, WordCache};
use crate::config::Config;
use crate::db::{Database, DbError};
use crate::services::images::{ImageSearch, ImageSearchConfig};
use crate::services::llm_provider::LLMProvider;
use crate::state::AppState;

/// Router with the request tracing and CORS layers applied.
pub fn build_router(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Picks the persistent cache tier: redis when reachable, then a directory,
/// then process memory.
pub async fn select_cache_tier(config: &Config) -> PersistentTier {
    if let Some(url) = config.redis_url.as_deref() {
        match RedisCache::connect(url).await {
            Ok(cache) => {
                tracing::info!("word cache persisted in redis");
                return PersistentTier::Redis(cache);
            }
            Err(err) => {
                tracing::warn!(error = %err, "redis unavailable, falling back");
            }
        }
    }
    match config.word_cache_dir.as_deref() {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "word cache persisted on disk");
            PersistentTier::file(dir)
        }
        None => PersistentTier::memory(),
    }
}

/// Wires the database, cache and providers described by `config` into an
/// [`AppState`].
pub async fn create_state(config: Config, db: Database) -> AppState {
    let tier = select_cache_tier(&config).await;
    let word_cache = Arc::new(WordCache::new(
        Arc::new(DbWordSource::new(db.clone())),
        tier,
        config.word_cache_ttl,
    ));
    let images = ImageSearchConfig::from_config(&config).map(ImageSearch::new);
    AppState::new(config, db, word_cache, LLMProvider::from_env(), images)
}

pub async fn create_app(config: Config) -> Result<axum::Router, DbError> {
    let db = Database::connect(config.database_url.as_deref()).await?;
    Ok(build_router(create_state(config, db).await))
}
