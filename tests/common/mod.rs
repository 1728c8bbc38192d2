#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::Query;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use oxford_vocab_backend::auth::sign_access_token;
use oxford_vocab_backend::cache::{DbWordSource, PersistentTier, WordCache};
use oxford_vocab_backend::config::Config;
use oxford_vocab_backend::db::operations::words;
use oxford_vocab_backend::db::Database;
use oxford_vocab_backend::models::Word;
use oxford_vocab_backend::services::images::{ImageSearch, ImageSearchConfig};
use oxford_vocab_backend::services::llm_provider::{LLMConfig, LLMProvider};
use oxford_vocab_backend::state::AppState;
use oxford_vocab_backend::build_router;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

pub fn sample_words() -> Vec<Word> {
    vec![
        Word::new("w1", "cat", "a small domestic animal"),
        Word::new("w2", "dog", "an animal kept as a pet"),
        Word::new("w3", "bread", "food made from flour"),
        Word::new("w4", "run", "move quickly on foot").with_example("I run every morning."),
        Word::new("w5", "happy", "feeling pleasure"),
    ]
}

pub fn unconfigured_llm() -> LLMProvider {
    llm_at(None)
}

/// Provider pointed at `endpoint` with a dummy key, or unconfigured for `None`.
pub fn llm_at(endpoint: Option<String>) -> LLMProvider {
    LLMProvider::new(LLMConfig {
        api_key: endpoint.as_ref().map(|_| "test-key".to_string()),
        model: "test-model".to_string(),
        api_endpoint: endpoint.unwrap_or_default(),
        timeout: Duration::from_secs(5),
    })
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(unconfigured_llm()).await
}

pub async fn create_test_app_with(llm: LLMProvider) -> TestApp {
    create_test_app_full(llm, None).await
}

pub async fn create_test_app_with_images(images: ImageSearch) -> TestApp {
    create_test_app_full(unconfigured_llm(), Some(images)).await
}

pub async fn create_test_app_full(llm: LLMProvider, images: Option<ImageSearch>) -> TestApp {
    let db = Database::in_memory().await.unwrap();
    words::upsert_words(&db, &sample_words()).await.unwrap();

    let config = Config {
        auth_jwt_secret: Some(TEST_SECRET.to_string()),
        ..Config::default()
    };
    let cache = Arc::new(WordCache::new(
        Arc::new(DbWordSource::new(db.clone())),
        PersistentTier::memory(),
        config.word_cache_ttl,
    ));
    let state = AppState::new(config, db.clone(), cache, llm, images);

    TestApp {
        router: build_router(state),
        db,
    }
}

pub fn bearer(user_id: &str) -> String {
    let token = sign_access_token(user_id, None, TEST_SECRET, chrono::Duration::hours(1)).unwrap();
    format!("Bearer {token}")
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header("authorization", bearer(user));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        user: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header("authorization", bearer(user));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }
}

/// Serves `/v1/chat/completions` with a fixed status and JSON body.
/// Returns the base endpoint to hand to [`llm_at`].
pub async fn spawn_chat_stub(status: StatusCode, body: Value) -> String {
    spawn_counting_chat_stub(status, body).await.0
}

/// Like [`spawn_chat_stub`], also counting the requests it receives.
pub async fn spawn_counting_chat_stub(
    status: StatusCode,
    body: Value,
) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let body = body.clone();
            counter.fetch_add(1, Ordering::SeqCst);
            async move { (status, Json(body)) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1"), hits)
}

pub fn chat_reply(content: &str) -> Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

/// Image search answering hits only for `known` terms, at `{base}/img/{term}.jpg`.
/// Returns the search endpoint URL.
pub async fn spawn_image_stub(known: &'static [&'static str]) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/search/photos",
        get(move |Query(params): Query<HashMap<String, String>>| async move {
            let term = params.get("query").cloned().unwrap_or_default();
            if known.contains(&term.as_str()) {
                let url = format!("http://{addr}/img/{term}.jpg");
                Json(serde_json::json!({ "results": [{ "urls": { "small": url } }] }))
            } else {
                Json(serde_json::json!({ "results": [] }))
            }
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/search/photos")
}

pub fn image_search_at(endpoint: String) -> ImageSearch {
    ImageSearch::new(ImageSearchConfig {
        endpoint,
        api_key: None,
        delay: Duration::from_millis(1),
    })
}
