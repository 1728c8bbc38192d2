use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::{Database, DbError};
use crate::models::{Level, Word};

const WORD_COLUMNS: &str = concat!(
    r#""id","term","meaning","part_of_speech","example","ipa","#,
    r#""image_url","topic","level""#,
);

pub async fn list_words(db: &Database) -> Result<Vec<Word>, DbError> {
    let sql = format!(r#"SELECT {WORD_COLUMNS} FROM "words" ORDER BY "term" COLLATE NOCASE, "id""#);
    let rows = sqlx::query(&sql).fetch_all(db.pool()).await?;
    rows.iter().map(map_word_row).collect()
}

pub async fn list_words_missing_image(db: &Database, limit: i64) -> Result<Vec<Word>, DbError> {
    let sql = format!(
        r#"SELECT {WORD_COLUMNS} FROM "words"
        WHERE "image_url" IS NULL OR TRIM("image_url") = ''
        ORDER BY "term" COLLATE NOCASE
        LIMIT ?"#
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(db.pool()).await?;
    rows.iter().map(map_word_row).collect()
}

pub async fn count_words(db: &Database) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "words""#)
        .fetch_one(db.pool())
        .await?;
    Ok(count)
}

/// Inserts or replaces the given words in one transaction.
pub async fn upsert_words(db: &Database, words: &[Word]) -> Result<u64, DbError> {
    let mut tx = db.pool().begin().await?;
    let mut affected = 0;
    for word in words {
        let result = sqlx::query(
            r#"
            INSERT INTO "words"
              ("id","term","meaning","part_of_speech","example","ipa","image_url","topic","level")
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT("id") DO UPDATE SET
              "term" = excluded."term",
              "meaning" = excluded."meaning",
              "part_of_speech" = excluded."part_of_speech",
              "example" = excluded."example",
              "ipa" = excluded."ipa",
              "image_url" = COALESCE(excluded."image_url", "words"."image_url"),
              "topic" = excluded."topic",
              "level" = excluded."level"
            "#,
        )
        .bind(&word.id)
        .bind(&word.term)
        .bind(&word.meaning)
        .bind(&word.part_of_speech)
        .bind(&word.example)
        .bind(&word.ipa)
        .bind(&word.image_url)
        .bind(&word.topic)
        .bind(word.level.map(Level::as_str))
        .execute(&mut *tx)
        .await?;
        affected += result.rows_affected();
    }
    tx.commit().await?;
    Ok(affected)
}

pub async fn set_image_url(db: &Database, word_id: &str, url: &str) -> Result<bool, DbError> {
    let result = sqlx::query(r#"UPDATE "words" SET "image_url" = ? WHERE "id" = ?"#)
        .bind(url)
        .bind(word_id)
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}

/// An unrecognised stored level reads as `None` so it gets derived later.
fn map_word_row(row: &SqliteRow) -> Result<Word, DbError> {
    let id: String = row.try_get("id")?;
    let level: Option<String> = row.try_get("level")?;
    let level = level
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|raw| match raw.parse::<Level>() {
            Ok(level) => Some(level),
            Err(()) => {
                tracing::warn!(word_id = %id, level = raw, "ignoring unknown stored word level");
                None
            }
        });

    Ok(Word {
        id,
        term: row.try_get("term")?,
        meaning: row.try_get("meaning")?,
        part_of_speech: row.try_get("part_of_speech")?,
        example: row.try_get("example")?,
        ipa: row.try_get("ipa")?,
        image_url: row.try_get("image_url")?,
        topic: row.try_get("topic")?,
        level,
    })
}
