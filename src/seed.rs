use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::operations::words;
use crate::db::{Database, DbError};
use crate::models::{Level, Word};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// One entry of the seed file. `id` and the derived fields are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedWord {
    id: Option<String>,
    #[serde(alias = "word")]
    term: String,
    #[serde(alias = "definition")]
    meaning: String,
    part_of_speech: Option<String>,
    example: Option<String>,
    ipa: Option<String>,
    image_url: Option<String>,
    topic: Option<String>,
    level: Option<Level>,
}

impl SeedWord {
    fn into_word(self) -> Option<Word> {
        let term = self.term.trim().to_string();
        if term.is_empty() {
            return None;
        }
        Some(Word {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            term,
            meaning: self.meaning.trim().to_string(),
            part_of_speech: self.part_of_speech,
            example: self.example,
            ipa: self.ipa,
            image_url: self.image_url,
            topic: self.topic,
            level: self.level,
        })
    }
}

pub fn parse_seed(contents: &str) -> Result<Vec<Word>, SeedError> {
    let raw: Vec<SeedWord> = serde_json::from_str(contents)?;
    Ok(raw.into_iter().filter_map(SeedWord::into_word).collect())
}

/// Loads the word list from `path` when the `words` table is still empty.
/// Returns the number of rows written.
pub async fn seed_words_if_empty(db: &Database, path: &Path) -> Result<u64, SeedError> {
    let existing = words::count_words(db).await?;
    if existing > 0 {
        tracing::debug!(existing, "words table already seeded");
        return Ok(0);
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    let parsed = parse_seed(&contents)?;
    let written = words::upsert_words(db, &parsed).await?;
    tracing::info!(count = written, path = %path.display(), "seeded words");
    Ok(written)
}
