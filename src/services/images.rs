use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::WordCache;
use crate::config::Config;
use crate::db::operations::words;
use crate::db::{Database, DbError};

pub const DEFAULT_BACKFILL_LIMIT: u32 = 20;
pub const MAX_BACKFILL_LIMIT: u32 = 100;
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Db(#[from] DbError),
}

#[derive(Debug, Clone)]
pub struct ImageSearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Pause between consecutive lookups.
    pub delay: Duration,
}

impl ImageSearchConfig {
    pub fn from_config(config: &Config) -> Option<Self> {
        let endpoint = config.image_search_url.clone()?;
        Some(Self {
            endpoint,
            api_key: config.image_search_key.clone(),
            delay: config.image_backfill_delay,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: Option<ResultUrls>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultUrls {
    small: Option<String>,
    regular: Option<String>,
}

impl SearchResponse {
    fn first_url(self) -> Option<String> {
        let from_results = self.results.into_iter().next().and_then(|result| {
            result
                .urls
                .and_then(|urls| urls.small.or(urls.regular))
                .or(result.url)
        });
        from_results.or(self.url).filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillReport {
    pub updated: usize,
    pub missing: usize,
}

#[derive(Clone)]
pub struct ImageSearch {
    config: ImageSearchConfig,
    client: reqwest::Client,
}

impl ImageSearch {
    pub fn new(config: ImageSearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    /// First image URL for `term`, or `None` when the search has no hits.
    pub async fn lookup(&self, term: &str) -> Result<Option<String>, ImageError> {
        let mut request = self
            .client
            .get(&self.config.endpoint)
            .query(&[("query", term), ("per_page", "1")]);
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Client-ID {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::HttpStatus(status));
        }
        let body: SearchResponse = response.json().await?;
        Ok(body.first_url())
    }

    /// Looks up images for words that have none, one request at a time with
    /// the configured pause in between. A failed lookup or write counts as
    /// missing, and the word cache is cleared whenever anything was stored.
    pub async fn backfill(
        &self,
        db: &Database,
        cache: &WordCache,
        limit: u32,
    ) -> Result<BackfillReport, ImageError> {
        let limit = limit.clamp(1, MAX_BACKFILL_LIMIT);
        let pending = words::list_words_missing_image(db, i64::from(limit)).await?;
        let mut report = BackfillReport::default();

        for (index, word) in pending.iter().enumerate() {
            if index > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            match self.lookup(&word.term).await {
                Ok(Some(url)) => match words::set_image_url(db, &word.id, &url).await {
                    Ok(true) => report.updated += 1,
                    Ok(false) => report.missing += 1,
                    Err(err) => {
                        tracing::warn!(
                            term = %word.term,
                            error = %err,
                            "storing image url failed"
                        );
                        report.missing += 1;
                    }
                },
                Ok(None) => report.missing += 1,
                Err(err) => {
                    tracing::warn!(term = %word.term, error = %err, "image lookup failed");
                    report.missing += 1;
                }
            }
        }

        if report.updated > 0 {
            cache.clear().await;
        }
        tracing::info!(
            updated = report.updated,
            missing = report.missing,
            "image backfill finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Option<String> {
        serde_json::from_str::<SearchResponse>(body).unwrap().first_url()
    }

    #[test]
    fn prefers_small_rendition() {
        let body = r#"{"results":[{"urls":{
            "small":"https://img/s.jpg",
            "regular":"https://img/r.jpg"
        }}]}"#;
        assert_eq!(parse(body).as_deref(), Some("https://img/s.jpg"));
    }

    #[test]
    fn falls_back_to_plain_urls() {
        assert_eq!(
            parse(r#"{"results":[{"url":"https://img/a.jpg"}]}"#).as_deref(),
            Some("https://img/a.jpg")
        );
        assert_eq!(
            parse(r#"{"url":"https://img/top.jpg"}"#).as_deref(),
            Some("https://img/top.jpg")
        );
        assert_eq!(parse(r#"{"results":[]}"#), None);
    }

    #[test]
    fn config_requires_endpoint() {
        let mut config = Config::default();
        assert!(ImageSearchConfig::from_config(&config).is_none());
        config.image_search_url = Some("http://images.test/search".into());
        let search = ImageSearchConfig::from_config(&config).unwrap();
        assert_eq!(search.delay, config.image_backfill_delay);
    }
}
