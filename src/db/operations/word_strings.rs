use sqlx::Row;

use crate::db::{now_iso, Database, DbError};
use crate::models::Source;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserWordStrings {
    pub mastered_words: String,
    pub learning_words: String,
}

pub async fn get_word_strings(
    db: &Database,
    user_id: &str,
    source: Source,
) -> Result<Option<UserWordStrings>, DbError> {
    let row = sqlx::query(
        r#"
        SELECT "mastered_words","learning_words"
        FROM "user_word_strings"
        WHERE "user_id" = ? AND "source" = ?
        "#,
    )
    .bind(user_id)
    .bind(source.as_str())
    .fetch_optional(db.pool())
    .await?;

    row.map(|row| {
        Ok::<_, DbError>(UserWordStrings {
            mastered_words: row.try_get("mastered_words")?,
            learning_words: row.try_get("learning_words")?,
        })
    })
    .transpose()
}

pub async fn put_word_strings(
    db: &Database,
    user_id: &str,
    source: Source,
    strings: &UserWordStrings,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO "user_word_strings"
          ("user_id","source","mastered_words","learning_words","updated_at")
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT("user_id","source") DO UPDATE SET
          "mastered_words" = excluded."mastered_words",
          "learning_words" = excluded."learning_words",
          "updated_at" = excluded."updated_at"
        "#,
    )
    .bind(user_id)
    .bind(source.as_str())
    .bind(&strings.mastered_words)
    .bind(&strings.learning_words)
    .bind(now_iso())
    .execute(db.pool())
    .await?;
    Ok(())
}

/// Every source row the user has, with unknown sources skipped.
pub async fn list_word_strings(
    db: &Database,
    user_id: &str,
) -> Result<Vec<(Source, UserWordStrings)>, DbError> {
    let rows = sqlx::query(
        r#"
        SELECT "source","mastered_words","learning_words"
        FROM "user_word_strings"
        WHERE "user_id" = ?
        ORDER BY "source"
        "#,
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let raw: String = row.try_get("source")?;
        let Ok(source) = raw.parse::<Source>() else {
            tracing::warn!(source = %raw, user_id, "skipping word strings with unknown source");
            continue;
        };
        out.push((
            source,
            UserWordStrings {
                mastered_words: row.try_get("mastered_words")?,
                learning_words: row.try_get("learning_words")?,
            },
        ));
    }
    Ok(out)
}
