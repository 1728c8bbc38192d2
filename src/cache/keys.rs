pub const WORDS_KEY: &str = "oxford_words";
pub const TOPIC_STATS_KEY: &str = "topic_stats";

pub const PERSISTED_KEYS: [&str; 2] = [WORDS_KEY, TOPIC_STATS_KEY];

pub fn redis_key(key: &str) -> String {
    format!("vocab:cache:{}", key)
}

pub fn file_name(key: &str) -> String {
    format!("{}.json", key)
}
