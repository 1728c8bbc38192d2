use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use crate::db::{now_iso, Database, DbError};
use crate::models::Source;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressRecord {
    pub user_id: String,
    pub word: String,
    pub word_meaning: Option<String>,
    pub source: Source,
    pub topic: Option<String>,
    pub is_mastered: bool,
    pub attempts: i64,
    pub learned_date: Option<String>,
    pub last_attempt_date: String,
    pub ai_feedback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressAttempt<'a> {
    pub word: &'a str,
    pub word_meaning: Option<&'a str>,
    pub source: Source,
    pub topic: Option<&'a str>,
    pub is_correct: bool,
    pub ai_feedback: Option<&'a str>,
}

#[derive(Debug, Default, Clone)]
pub struct ProgressFilter<'a> {
    pub source: Option<Source>,
    pub word: Option<&'a str>,
}

const PROGRESS_COLUMNS: &str = concat!(
    r#""user_id","word","word_meaning","source","topic","is_mastered","#,
    r#""attempts","learned_date","last_attempt_date","ai_feedback""#,
);

/// Upserts by `(user_id, word, source)`. Every call counts as one attempt and
/// the mastered flag follows the latest answer; `learned_date` is stamped the
/// first time the row becomes mastered and is kept afterwards.
pub async fn record_attempt(
    db: &Database,
    user_id: &str,
    attempt: &ProgressAttempt<'_>,
) -> Result<UserProgressRecord, DbError> {
    let now = now_iso();
    let sql = format!(
        r#"
        INSERT INTO "user_progress"
          ("id","user_id","word","word_meaning","source","topic","is_mastered",
           "attempts","learned_date","last_attempt_date","ai_feedback")
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, CASE WHEN ?7 = 1 THEN ?8 ELSE NULL END, ?8, ?9)
        ON CONFLICT("user_id","word","source") DO UPDATE SET
          "word_meaning" = COALESCE(excluded."word_meaning", "user_progress"."word_meaning"),
          "topic" = COALESCE(excluded."topic", "user_progress"."topic"),
          "is_mastered" = excluded."is_mastered",
          "attempts" = "user_progress"."attempts" + 1,
          "learned_date" = COALESCE("user_progress"."learned_date", excluded."learned_date"),
          "last_attempt_date" = excluded."last_attempt_date",
          "ai_feedback" = COALESCE(excluded."ai_feedback", "user_progress"."ai_feedback")
        RETURNING {PROGRESS_COLUMNS}
        "#
    );

    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(attempt.word)
        .bind(attempt.word_meaning)
        .bind(attempt.source.as_str())
        .bind(attempt.topic)
        .bind(attempt.is_correct)
        .bind(&now)
        .bind(attempt.ai_feedback)
        .fetch_one(db.pool())
        .await?;

    map_progress_row(&row)
}

pub async fn list_progress(
    db: &Database,
    user_id: &str,
    filter: &ProgressFilter<'_>,
) -> Result<Vec<UserProgressRecord>, DbError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        r#"SELECT {PROGRESS_COLUMNS} FROM "user_progress" WHERE "user_id" = "#
    ));
    qb.push_bind(user_id);
    if let Some(source) = filter.source {
        qb.push(r#" AND "source" = "#);
        qb.push_bind(source.as_str());
    }
    if let Some(word) = filter.word {
        qb.push(r#" AND "word" = "#);
        qb.push_bind(word);
    }
    qb.push(r#" ORDER BY "last_attempt_date" DESC, "word""#);

    let rows = qb.build().fetch_all(db.pool()).await?;
    rows.iter().map(map_progress_row).collect()
}

fn map_progress_row(row: &SqliteRow) -> Result<UserProgressRecord, DbError> {
    let source: String = row.try_get("source")?;
    let source = source.parse::<Source>().map_err(|_| DbError::Decode {
        column: "user_progress.source",
        value: source.clone(),
    })?;

    Ok(UserProgressRecord {
        user_id: row.try_get("user_id")?,
        word: row.try_get("word")?,
        word_meaning: row.try_get("word_meaning")?,
        source,
        topic: row.try_get("topic")?,
        is_mastered: row.try_get("is_mastered")?,
        attempts: row.try_get("attempts")?,
        learned_date: row.try_get("learned_date")?,
        last_attempt_date: row.try_get("last_attempt_date")?,
        ai_feedback: row.try_get("ai_feedback")?,
    })
}
