use std::sync::Arc;
use std::time::Instant;

use crate::cache::WordCache;
use crate::config::Config;
use crate::db::Database;
use crate::services::images::ImageSearch;
use crate::services::llm_provider::LLMProvider;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    config: Arc<Config>,
    db: Database,
    word_cache: Arc<WordCache>,
    llm: Arc<LLMProvider>,
    images: Option<Arc<ImageSearch>>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Database,
        word_cache: Arc<WordCache>,
        llm: LLMProvider,
        images: Option<ImageSearch>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            config: Arc::new(config),
            db,
            word_cache,
            llm: Arc::new(llm),
            images: images.map(Arc::new),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn word_cache(&self) -> &WordCache {
        &self.word_cache
    }

    pub fn llm(&self) -> &LLMProvider {
        &self.llm
    }

    /// `None` when no image search endpoint is configured.
    pub fn images(&self) -> Option<Arc<ImageSearch>> {
        self.images.clone()
    }
}
