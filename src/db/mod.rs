pub mod operations;
pub mod schema;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::schema::{split_sql_statements, SCHEMA_SQL};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid stored value in {column}: {value}")]
    Decode { column: &'static str, value: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Handle to the relational store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: Option<&str>) -> Result<Self, DbError> {
        let url = match url {
            Some(url) => url.to_string(),
            None => {
                let path = default_db_path();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| DbError::Io(e.to_string()))?;
                }
                format!("sqlite:{}?mode=rwc", path.display())
            }
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::Config(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        tracing::info!(%url, "database ready");
        Ok(db)
    }

    /// Private in-memory database. A single connection that never idles out
    /// keeps the data alive for the lifetime of the handle.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Config(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn migrate(&self) -> Result<(), DbError> {
        for statement in split_sql_statements(SCHEMA_SQL) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oxford-vocab")
        .join("data.db")
}

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
