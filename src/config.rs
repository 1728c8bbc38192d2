use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WORD_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_IMAGE_BACKFILL_DELAY_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Set when `ENABLE_FILE_LOGS` is on; daily rolling files land here.
    pub log_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub auth_jwt_secret: Option<String>,
    pub redis_url: Option<String>,
    pub word_cache_dir: Option<PathBuf>,
    pub word_cache_ttl: Duration,
    pub words_seed_path: Option<PathBuf>,
    pub image_search_url: Option<String>,
    pub image_search_key: Option<String>,
    pub image_backfill_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = file_logs.then(|| {
            PathBuf::from(env_string("LOG_DIR").unwrap_or_else(|| "./logs".to_string()))
        });

        let word_cache_ttl = env_u64("WORD_CACHE_TTL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_WORD_CACHE_TTL);

        let image_backfill_delay = Duration::from_millis(
            env_u64("IMAGE_BACKFILL_DELAY_MS").unwrap_or(DEFAULT_IMAGE_BACKFILL_DELAY_MS),
        );

        Self {
            host,
            port,
            log_level,
            log_dir,
            database_url: env_string("DATABASE_URL"),
            auth_jwt_secret: env_string("AUTH_JWT_SECRET"),
            redis_url: env_string("REDIS_URL"),
            word_cache_dir: env_string("WORD_CACHE_DIR").map(PathBuf::from),
            word_cache_ttl,
            words_seed_path: env_string("WORDS_SEED_PATH").map(PathBuf::from),
            image_search_url: env_string("IMAGE_SEARCH_URL"),
            image_search_key: env_string("IMAGE_SEARCH_KEY"),
            image_backfill_delay,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            log_level: "info".to_string(),
            log_dir: None,
            database_url: None,
            auth_jwt_secret: None,
            redis_url: None,
            word_cache_dir: None,
            word_cache_ttl: DEFAULT_WORD_CACHE_TTL,
            words_seed_path: None,
            image_search_url: None,
            image_search_key: None,
            image_backfill_delay: Duration::from_millis(DEFAULT_IMAGE_BACKFILL_DELAY_MS),
        }
    }
}

pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}
