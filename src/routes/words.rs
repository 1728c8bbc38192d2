use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::models::Word;
use crate::response::{AppError, MessageResponse, SuccessResponse};
use crate::services::images::DEFAULT_BACKFILL_LIMIT;
use crate::state::AppState;

const DEFAULT_GAME_SIZE: i64 = 10;
const MAX_GAME_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    n: Option<String>,
    topic: Option<String>,
}

#[derive(Serialize)]
struct GameResponse {
    success: bool,
    data: Vec<Word>,
    count: usize,
}

#[derive(Debug, Deserialize)]
pub struct BackfillQuery {
    limit: Option<u32>,
}

pub async fn list_words(State(state): State<AppState>) -> Result<Response, AppError> {
    let words = state.word_cache().load_all_words().await?;
    Ok(SuccessResponse::new(words.as_slice()).into_response())
}

pub async fn list_topics(State(state): State<AppState>) -> Result<Response, AppError> {
    let stats = state.word_cache().load_topic_stats().await?;
    Ok(SuccessResponse::new(stats.as_slice()).into_response())
}

/// Unknown topic names yield an empty list.
pub async fn topic_words(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let words = state.word_cache().get_words_by_topic(&name).await?;
    Ok(SuccessResponse::new(words.as_slice()).into_response())
}

pub async fn clear_cache(State(state): State<AppState>) -> impl IntoResponse {
    state.word_cache().clear().await;
    tracing::info!("word cache cleared on request");
    Json(MessageResponse {
        success: true,
        message: "Word cache cleared",
    })
}

pub async fn random_words(
    State(state): State<AppState>,
    Query(query): Query<GameQuery>,
) -> Result<impl IntoResponse, AppError> {
    let n = parse_game_size(query.n.as_deref())?;

    let pool = match query.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => state.word_cache().get_words_by_topic(topic).await?,
        None => state.word_cache().load_all_words().await?,
    };

    let data: Vec<Word> = pool
        .choose_multiple(&mut rand::rng(), n)
        .cloned()
        .collect();

    Ok(Json(GameResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

pub async fn backfill_images(
    State(state): State<AppState>,
    Query(query): Query<BackfillQuery>,
) -> Result<impl IntoResponse, AppError> {
    let Some(images) = state.images() else {
        return Err(AppError::unavailable("Image search is not configured"));
    };

    let report = images
        .backfill(
            state.db(),
            state.word_cache(),
            query.limit.unwrap_or(DEFAULT_BACKFILL_LIMIT),
        )
        .await
        .map_err(|err| AppError::internal(err.to_string()))?;

    Ok(SuccessResponse::new(report))
}

fn parse_game_size(raw: Option<&str>) -> Result<usize, AppError> {
    let n = match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => DEFAULT_GAME_SIZE,
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::validation("n must be an integer"))?,
    };
    Ok(n.clamp(1, MAX_GAME_SIZE) as usize)
}
