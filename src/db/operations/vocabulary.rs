use serde::Serialize;
use sqlx::Row;

use crate::db::{now_iso, Database, DbError};
use crate::services::csv_import::VocabularyRow;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVocabularyEntry {
    pub term: String,
    pub meaning: String,
    pub created_at: String,
}

/// Later rows for the same term overwrite earlier ones.
pub async fn upsert_entries(
    db: &Database,
    user_id: &str,
    rows: &[VocabularyRow],
) -> Result<usize, DbError> {
    let now = now_iso();
    let mut tx = db.pool().begin().await?;
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO "user_vocabulary" ("user_id","term","meaning","created_at")
            VALUES (?, ?, ?, ?)
            ON CONFLICT("user_id","term") DO UPDATE SET "meaning" = excluded."meaning"
            "#,
        )
        .bind(user_id)
        .bind(&row.term)
        .bind(&row.meaning)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len())
}

pub async fn list_entries(
    db: &Database,
    user_id: &str,
) -> Result<Vec<UserVocabularyEntry>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT "term","meaning","created_at"
        FROM "user_vocabulary"
        WHERE "user_id" = ?
        ORDER BY "term" COLLATE NOCASE
        "#,
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    rows.iter()
        .map(|row| {
            Ok::<_, DbError>(UserVocabularyEntry {
                term: row.try_get("term")?,
                meaning: row.try_get("meaning")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .collect()
}
