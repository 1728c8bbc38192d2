use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

use crate::db::{operations::words, Database, DbError};
use crate::models::Word;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("word source unavailable: {0}")]
    Unavailable(String),
}

/// Where the full word list comes from on a cache miss.
pub trait WordSource: Send + Sync {
    fn fetch_words(&self) -> BoxFuture<'_, Result<Vec<Word>, SourceError>>;
}

/// Reads the seeded `words` table.
pub struct DbWordSource {
    db: Database,
}

impl DbWordSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl WordSource for DbWordSource {
    fn fetch_words(&self) -> BoxFuture<'_, Result<Vec<Word>, SourceError>> {
        async move { Ok(words::list_words(&self.db).await?) }.boxed()
    }
}

/// Fixed list held in memory.
pub struct StaticWordSource {
    words: Vec<Word>,
}

impl StaticWordSource {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }
}

impl WordSource for StaticWordSource {
    fn fetch_words(&self) -> BoxFuture<'_, Result<Vec<Word>, SourceError>> {
        let words = self.words.clone();
        async move { Ok(words) }.boxed()
    }
}
