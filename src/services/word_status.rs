use serde::Serialize;
use thiserror::Error;

use crate::db::operations::word_strings::{self, UserWordStrings};
use crate::db::{Database, DbError};
use crate::models::Source;
use crate::services::word_strings::{normalize_term, WordLists, WordStatus, WordStringError};

#[derive(Debug, Error)]
pub enum WordStatusError {
    #[error(transparent)]
    InvalidTerm(#[from] WordStringError),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    pub word: String,
    pub source: Source,
    pub status: WordStatus,
    pub mastered_count: usize,
    pub learning_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
    pub source: Source,
    pub mastered: usize,
    pub learning: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub sources: Vec<SourceStats>,
    pub total_mastered: usize,
    pub total_learning: usize,
}

pub async fn load_lists(
    db: &Database,
    user_id: &str,
    source: Source,
) -> Result<WordLists, DbError> {
    let stored = word_strings::get_word_strings(db, user_id, source)
        .await?
        .unwrap_or_default();
    Ok(WordLists::decode(&stored.mastered_words, &stored.learning_words))
}

pub async fn get_status(
    db: &Database,
    user_id: &str,
    source: Source,
    term: &str,
) -> Result<WordStatus, WordStatusError> {
    let term = normalize_term(term)?;
    Ok(load_lists(db, user_id, source).await?.status_of(&term))
}

/// Read-modify-write of the two delimiter strings. Concurrent writers for the
/// same user and source race; the last write wins.
pub async fn record_answer(
    db: &Database,
    user_id: &str,
    source: Source,
    term: &str,
    is_correct: bool,
) -> Result<RecordOutcome, WordStatusError> {
    let term = normalize_term(term)?;
    let mut lists = load_lists(db, user_id, source).await?;
    let status = lists.record(&term, is_correct);

    let (mastered_words, learning_words) = lists.encode();
    word_strings::put_word_strings(
        db,
        user_id,
        source,
        &UserWordStrings {
            mastered_words,
            learning_words,
        },
    )
    .await?;

    tracing::debug!(user_id, %source, term, status = status.as_str(), "word status recorded");

    Ok(RecordOutcome {
        word: term,
        source,
        status,
        mastered_count: lists.mastered.len(),
        learning_count: lists.learning.len(),
    })
}

/// Counts per known source, zero-filled for sources the user never touched.
pub async fn stats(db: &Database, user_id: &str) -> Result<StatsSummary, DbError> {
    let stored = word_strings::list_word_strings(db, user_id).await?;

    let sources: Vec<SourceStats> = Source::ALL
        .iter()
        .map(|&source| {
            let lists = stored
                .iter()
                .find(|(s, _)| *s == source)
                .map(|(_, strings)| {
                    WordLists::decode(&strings.mastered_words, &strings.learning_words)
                })
                .unwrap_or_default();
            SourceStats {
                source,
                mastered: lists.mastered.len(),
                learning: lists.learning.len(),
            }
        })
        .collect();

    Ok(StatsSummary {
        total_mastered: sources.iter().map(|s| s.mastered).sum(),
        total_learning: sources.iter().map(|s| s.learning).sum(),
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn status_moves_from_not_started_to_mastered() {
        let db = Database::in_memory().await.unwrap();

        let before = get_status(&db, "u1", Source::Oxford, "cat").await.unwrap();
        assert_eq!(before, WordStatus::NotStarted);

        let outcome = record_answer(&db, "u1", Source::Oxford, " cat ", true).await.unwrap();
        assert_eq!(outcome.word, "cat");
        assert_eq!(outcome.status, WordStatus::Mastered);
        assert_eq!(outcome.mastered_count, 1);

        let after = get_status(&db, "u1", Source::Oxford, "cat").await.unwrap();
        assert_eq!(after, WordStatus::Mastered);

        // Other sources and users are untouched.
        let topics = get_status(&db, "u1", Source::Topics, "cat").await.unwrap();
        assert_eq!(topics, WordStatus::NotStarted);
        let other = get_status(&db, "u2", Source::Oxford, "cat").await.unwrap();
        assert_eq!(other, WordStatus::NotStarted);
    }

    #[tokio::test]
    async fn wrong_answer_demotes_to_learning() {
        let db = Database::in_memory().await.unwrap();
        record_answer(&db, "u1", Source::Oxford, "cat", true).await.unwrap();
        record_answer(&db, "u1", Source::Oxford, "cat", false).await.unwrap();

        let lists = load_lists(&db, "u1", Source::Oxford).await.unwrap();
        assert!(lists.mastered.is_empty());
        assert_eq!(lists.learning, vec!["cat"]);
    }

    #[tokio::test]
    async fn delimiter_in_term_is_rejected() {
        let db = Database::in_memory().await.unwrap();
        let err = record_answer(&db, "u1", Source::Oxford, "don't", true)
            .await
            .unwrap_err();
        assert!(matches!(err, WordStatusError::InvalidTerm(_)));
    }

    #[tokio::test]
    async fn stats_sum_across_sources() {
        let db = Database::in_memory().await.unwrap();
        record_answer(&db, "u1", Source::Oxford, "cat", true).await.unwrap();
        record_answer(&db, "u1", Source::Oxford, "dog", false).await.unwrap();
        record_answer(&db, "u1", Source::Topics, "apple", true).await.unwrap();

        let summary = stats(&db, "u1").await.unwrap();
        assert_eq!(summary.sources.len(), Source::ALL.len());
        assert_eq!(summary.total_mastered, 2);
        assert_eq!(summary.total_learning, 1);

        let empty = stats(&db, "nobody").await.unwrap();
        assert_eq!(empty.total_mastered + empty.total_learning, 0);
    }
}
