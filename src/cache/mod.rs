//! Read-through cache for the word list and the derived topic statistics.
//!
//! Lookups go memory first, then the [`PersistentTier`], then the
//! [`WordSource`]. Entries carry their fetch time and are served only while
//! younger than the configured TTL. Nothing refreshes in the background and
//! nothing outside [`WordCache::clear`] invalidates early.

pub mod keys;
mod source;
mod tier;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{TopicStat, Word};
use crate::services::topics;

pub use source::{DbWordSource, SourceError, StaticWordSource, WordSource};
pub use tier::{PersistentTier, RedisCache};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("word source failed: {0}")]
    Source(#[from] SourceError),
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Serialized form of a persisted entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub payload: T,
    pub fetched_at: i64,
}

struct Stamped<T> {
    value: Arc<T>,
    fetched_at: i64,
}

impl<T> Clone for Stamped<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    words: Option<Stamped<Vec<Word>>>,
    topic_stats: Option<Stamped<Vec<TopicStat>>>,
    by_topic: HashMap<&'static str, Arc<Vec<Word>>>,
}

pub struct WordCache {
    source: Arc<dyn WordSource>,
    tier: PersistentTier,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: RwLock<MemoryState>,
    // Held for the duration of a word-list fetch so concurrent misses share it.
    load_lock: Mutex<()>,
}

impl WordCache {
    pub fn new(source: Arc<dyn WordSource>, tier: PersistentTier, ttl: Duration) -> Self {
        Self::with_clock(source, tier, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn WordSource>,
        tier: PersistentTier,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            tier,
            clock,
            ttl,
            state: RwLock::new(MemoryState::default()),
            load_lock: Mutex::new(()),
        }
    }

    /// Whether the persistent tier answers right now.
    pub async fn tier_connected(&self) -> bool {
        self.tier.is_connected().await
    }

    pub fn tier_kind(&self) -> &'static str {
        self.tier.kind()
    }

    pub async fn load_all_words(&self) -> Result<Arc<Vec<Word>>, CacheError> {
        if let Some(words) = self.fresh_words() {
            return Ok(words);
        }

        let _loading = self.load_lock.lock().await;
        if let Some(words) = self.fresh_words() {
            return Ok(words);
        }

        if let Some(entry) = self.read_persisted::<Vec<Word>>(keys::WORDS_KEY).await {
            tracing::debug!(
                count = entry.payload.len(),
                "word list restored from persistent cache"
            );
            let words = Arc::new(entry.payload);
            self.install_words(Arc::clone(&words), entry.fetched_at);
            return Ok(words);
        }

        let fetched = match self.source.fetch_words().await {
            Ok(words) => words,
            Err(err) => {
                tracing::error!(error = %err, "word list fetch failed");
                return Err(err.into());
            }
        };

        let words: Vec<Word> = fetched.into_iter().map(topics::augment).collect();
        let fetched_at = self.clock.now_ms();
        self.write_persisted(keys::WORDS_KEY, &words, fetched_at).await;
        tracing::info!(count = words.len(), "word list fetched");

        let words = Arc::new(words);
        self.install_words(Arc::clone(&words), fetched_at);
        Ok(words)
    }

    pub async fn load_topic_stats(&self) -> Result<Arc<Vec<TopicStat>>, CacheError> {
        if let Some(stats) = self.fresh_topic_stats() {
            return Ok(stats);
        }

        if let Some(entry) = self
            .read_persisted::<Vec<TopicStat>>(keys::TOPIC_STATS_KEY)
            .await
        {
            let stats = Arc::new(entry.payload);
            self.state.write().topic_stats = Some(Stamped {
                value: Arc::clone(&stats),
                fetched_at: entry.fetched_at,
            });
            return Ok(stats);
        }

        let words = self.load_all_words().await?;
        let stats = topics::tally(&words);
        let fetched_at = self.clock.now_ms();
        self.write_persisted(keys::TOPIC_STATS_KEY, &stats, fetched_at)
            .await;

        let stats = Arc::new(stats);
        self.state.write().topic_stats = Some(Stamped {
            value: Arc::clone(&stats),
            fetched_at,
        });
        Ok(stats)
    }

    /// Words whose derived topic is `name` (case-insensitive). Unknown topics
    /// yield an empty list. Slices are memoised in memory only.
    pub async fn get_words_by_topic(&self, name: &str) -> Result<Arc<Vec<Word>>, CacheError> {
        let Some(topic) = topics::canonical_topic(name) else {
            return Ok(Arc::new(Vec::new()));
        };

        let words = self.load_all_words().await?;
        if let Some(hit) = self.state.read().by_topic.get(topic) {
            return Ok(Arc::clone(hit));
        }

        let slice: Arc<Vec<Word>> = Arc::new(
            words
                .iter()
                .filter(|w| w.topic.as_deref() == Some(topic))
                .cloned()
                .collect(),
        );

        let mut state = self.state.write();
        // Only memoise against the list the slice was cut from.
        let current = state
            .words
            .as_ref()
            .is_some_and(|s| Arc::ptr_eq(&s.value, &words));
        if current {
            state.by_topic.insert(topic, Arc::clone(&slice));
        }
        Ok(slice)
    }

    pub async fn clear(&self) {
        *self.state.write() = MemoryState::default();
        for key in keys::PERSISTED_KEYS {
            self.tier.remove(key).await;
        }
        tracing::info!("word cache cleared");
    }

    fn is_fresh(&self, fetched_at: i64) -> bool {
        let age = self.clock.now_ms() - fetched_at;
        age >= 0 && (age as u128) < self.ttl.as_millis()
    }

    fn fresh_words(&self) -> Option<Arc<Vec<Word>>> {
        let state = self.state.read();
        state
            .words
            .as_ref()
            .filter(|s| self.is_fresh(s.fetched_at))
            .map(|s| Arc::clone(&s.value))
    }

    fn fresh_topic_stats(&self) -> Option<Arc<Vec<TopicStat>>> {
        let state = self.state.read();
        state
            .topic_stats
            .as_ref()
            .filter(|s| self.is_fresh(s.fetched_at))
            .map(|s| Arc::clone(&s.value))
    }

    fn install_words(&self, words: Arc<Vec<Word>>, fetched_at: i64) {
        let mut state = self.state.write();
        state.words = Some(Stamped {
            value: words,
            fetched_at,
        });
        state.by_topic.clear();
    }

    /// A missing, stale or unparsable entry is a miss. Unparsable ones are dropped.
    async fn read_persisted<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = self.tier.read(key).await?;
        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) if self.is_fresh(entry.fetched_at) => Some(entry),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(key, error = %err, "discarding unreadable cache entry");
                self.tier.remove(key).await;
                None
            }
        }
    }

    async fn write_persisted<T: Serialize + ?Sized>(
        &self,
        key: &str,
        payload: &T,
        fetched_at: i64,
    ) {
        let entry = CacheEntry {
            payload,
            fetched_at,
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => self.tier.write(key, raw, self.ttl).await,
            Err(err) => tracing::warn!(key, error = %err, "cache entry serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;

    const TTL: Duration = Duration::from_secs(5 * 60);

    struct ManualClock(AtomicI64);

    impl ManualClock {
        fn new(start: i64) -> Arc<Self> {
            Arc::new(Self(AtomicI64::new(start)))
        }

        fn advance(&self, by: Duration) {
            self.0.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct CountingSource {
        words: Vec<Word>,
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingSource {
        fn new(words: Vec<Word>) -> Arc<Self> {
            Arc::new(Self {
                words,
                calls: AtomicUsize::new(0),
                fail: false,
                delay: Duration::ZERO,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl WordSource for CountingSource {
        fn fetch_words(&self) -> BoxFuture<'_, Result<Vec<Word>, SourceError>> {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                if self.fail {
                    return Err(SourceError::Unavailable("offline".to_string()));
                }
                Ok(self.words.clone())
            }
            .boxed()
        }
    }

    fn sample_words() -> Vec<Word> {
        vec![
            Word::new("1", "cat", "a small animal with fur"),
            Word::new("2", "bread", "a food made from flour"),
            Word::new("3", "although", "despite the fact that"),
        ]
    }

    fn cache_with(
        source: Arc<CountingSource>,
        tier: PersistentTier,
        clock: Arc<ManualClock>,
    ) -> WordCache {
        WordCache::with_clock(source, tier, TTL, clock)
    }

    #[tokio::test]
    async fn second_call_within_ttl_does_not_refetch() {
        let source = CountingSource::new(sample_words());
        let clock = ManualClock::new(1_000_000);
        let cache = cache_with(Arc::clone(&source), PersistentTier::memory(), Arc::clone(&clock));

        cache.load_all_words().await.unwrap();
        clock.advance(Duration::from_secs(4 * 60));
        cache.load_all_words().await.unwrap();
        assert_eq!(source.calls(), 1);

        clock.advance(Duration::from_secs(61));
        cache.load_all_words().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn loaded_words_carry_topic_and_level() {
        let source = CountingSource::new(sample_words());
        let cache = cache_with(source, PersistentTier::memory(), ManualClock::new(0));

        let words = cache.load_all_words().await.unwrap();
        assert_eq!(words[0].topic.as_deref(), Some("Animals"));
        assert_eq!(words[2].topic.as_deref(), Some(topics::MISCELLANEOUS));
        assert!(words.iter().all(|w| w.level.is_some()));
    }

    #[tokio::test]
    async fn persisted_entry_survives_a_new_cache_instance() {
        let dir = tempfile::tempdir().unwrap();
        let tier = PersistentTier::file(dir.path());
        let clock = ManualClock::new(5_000);

        let first_source = CountingSource::new(sample_words());
        let first = cache_with(Arc::clone(&first_source), tier.clone(), Arc::clone(&clock));
        first.load_all_words().await.unwrap();
        drop(first);

        let second_source = CountingSource::new(Vec::new());
        let second = cache_with(Arc::clone(&second_source), tier, Arc::clone(&clock));
        clock.advance(Duration::from_secs(60));
        let words = second.load_all_words().await.unwrap();

        assert_eq!(words.len(), 3);
        assert_eq!(first_source.calls(), 1);
        assert_eq!(second_source.calls(), 0);
    }

    #[tokio::test]
    async fn unparsable_persisted_entry_falls_back_to_source() {
        let tier = PersistentTier::memory();
        tier.write(keys::WORDS_KEY, "{not json".to_string(), TTL).await;

        let source = CountingSource::new(sample_words());
        let cache = cache_with(Arc::clone(&source), tier.clone(), ManualClock::new(0));
        let words = cache.load_all_words().await.unwrap();

        assert_eq!(words.len(), 3);
        assert_eq!(source.calls(), 1);
        let rewritten = tier.read(keys::WORDS_KEY).await.unwrap();
        assert!(serde_json::from_str::<CacheEntry<Vec<Word>>>(&rewritten).is_ok());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_empty_and_retries_next_call() {
        let failing = Arc::new(CountingSource {
            words: sample_words(),
            calls: AtomicUsize::new(0),
            fail: true,
            delay: Duration::ZERO,
        });
        let tier = PersistentTier::memory();
        let cache = cache_with(Arc::clone(&failing), tier.clone(), ManualClock::new(0));

        assert!(cache.load_all_words().await.is_err());
        assert!(cache.load_all_words().await.is_err());
        assert_eq!(failing.calls(), 2);
        assert!(tier.read(keys::WORDS_KEY).await.is_none());
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let source = Arc::new(CountingSource {
            words: sample_words(),
            calls: AtomicUsize::new(0),
            fail: false,
            delay: Duration::from_millis(50),
        });
        let cache = Arc::new(cache_with(
            Arc::clone(&source),
            PersistentTier::memory(),
            ManualClock::new(0),
        ));

        let a = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.load_all_words().await.map(|w| w.len()) }
        });
        let b = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.load_all_words().await.map(|w| w.len()) }
        });

        assert_eq!(a.await.unwrap().unwrap(), 3);
        assert_eq!(b.await.unwrap().unwrap(), 3);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn topic_stats_are_cached_under_their_own_key() {
        let source = CountingSource::new(sample_words());
        let tier = PersistentTier::memory();
        let cache = cache_with(Arc::clone(&source), tier.clone(), ManualClock::new(0));

        let stats = cache.load_topic_stats().await.unwrap();
        assert_eq!(stats.len(), 25);
        assert_eq!(stats.iter().map(|s| s.word_count).sum::<usize>(), 3);
        assert!(tier.read(keys::TOPIC_STATS_KEY).await.is_some());

        cache.load_topic_stats().await.unwrap();
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn words_by_topic_filters_and_memoises() {
        let source = CountingSource::new(sample_words());
        let cache = cache_with(Arc::clone(&source), PersistentTier::memory(), ManualClock::new(0));

        let animals = cache.get_words_by_topic("animals").await.unwrap();
        assert_eq!(animals.len(), 1);
        assert_eq!(animals[0].term, "cat");

        let again = cache.get_words_by_topic("Animals").await.unwrap();
        assert!(Arc::ptr_eq(&animals, &again));

        assert!(cache.get_words_by_topic("Dragons").await.unwrap().is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn stored_topic_spelling_does_not_hide_words() {
        let mut cat = Word::new("1", "cat", "a small animal with fur");
        cat.topic = Some("animals".to_string());
        let mut dog = Word::new("2", "dog", "a loyal pet");
        dog.topic = Some("Pets".to_string());
        let source = CountingSource::new(vec![cat, dog]);
        let cache = cache_with(source, PersistentTier::memory(), ManualClock::new(0));

        let animals = cache.get_words_by_topic("Animals").await.unwrap();
        assert_eq!(animals.len(), 2);

        let stats = cache.load_topic_stats().await.unwrap();
        assert_eq!(stats.iter().map(|s| s.word_count).sum::<usize>(), 2);
    }

    #[tokio::test]
    async fn clear_drops_memory_and_persisted_state() {
        let source = CountingSource::new(sample_words());
        let tier = PersistentTier::memory();
        let cache = cache_with(Arc::clone(&source), tier.clone(), ManualClock::new(0));

        cache.load_topic_stats().await.unwrap();
        cache.clear().await;

        assert!(tier.read(keys::WORDS_KEY).await.is_none());
        assert!(tier.read(keys::TOPIC_STATS_KEY).await.is_none());
        cache.load_all_words().await.unwrap();
        assert_eq!(source.calls(), 2);
    }
}
