mod evaluation;
mod health;
mod progress;
mod stats;
mod vocabulary;
mod word_status;
mod words;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;

use crate::middleware::auth::require_auth;
use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/words", get(words::list_words).fallback(fallback_handler))
        .route("/api/topics", get(words::list_topics).fallback(fallback_handler))
        .route(
            "/api/topics/:name/words",
            get(words::topic_words).fallback(fallback_handler),
        )
        .route(
            "/api/game/random",
            get(words::random_words).fallback(fallback_handler),
        )
        .route(
            "/api/ai-evaluate-simple",
            post(evaluation::evaluate_simple).fallback(fallback_handler),
        )
        .route(
            "/api/ai-evaluate",
            post(evaluation::evaluate_strict).fallback(fallback_handler),
        );

    let protected = Router::new()
        .route("/api/cache", delete(words::clear_cache).fallback(fallback_handler))
        .route(
            "/api/words/images/backfill",
            post(words::backfill_images).fallback(fallback_handler),
        )
        .route(
            "/api/progress",
            get(progress::list_progress)
                .post(progress::record_progress)
                .fallback(fallback_handler),
        )
        .route(
            "/api/word-status",
            get(word_status::get_word_status)
                .post(word_status::post_word_status)
                .fallback(fallback_handler),
        )
        .route("/api/stats", get(stats::get_stats).fallback(fallback_handler))
        .route(
            "/api/vocabulary",
            get(vocabulary::list_vocabulary).fallback(fallback_handler),
        )
        .route(
            "/api/vocabulary/import",
            post(vocabulary::import_csv).fallback(fallback_handler),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}
