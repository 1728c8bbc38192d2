use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::models::Source;
use crate::response::{AppError, SuccessResponse};
use crate::routes::progress::parse_source;
use crate::services::word_status::{self, RecordOutcome};
use crate::services::word_strings::WordStatus;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    word: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    word: Option<String>,
    source: Option<String>,
    is_correct: Option<bool>,
}

#[derive(Serialize)]
struct StatusResponse<'a> {
    success: bool,
    word: &'a str,
    source: Source,
    status: WordStatus,
}

#[derive(Serialize)]
struct ListsResponse {
    success: bool,
    source: Source,
    mastered: Vec<String>,
    learning: Vec<String>,
}

/// With `word`, the status of that term; without it, both lists for the source.
pub async fn get_word_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, AppError> {
    let source = query
        .source
        .as_deref()
        .map(parse_source)
        .transpose()?
        .unwrap_or(Source::Oxford);

    match query.word.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        Some(word) => {
            let status = word_status::get_status(state.db(), &user.id, source, word).await?;
            Ok(Json(StatusResponse {
                success: true,
                word,
                source,
                status,
            })
            .into_response())
        }
        None => {
            let lists = word_status::load_lists(state.db(), &user.id, source).await?;
            Ok(Json(ListsResponse {
                success: true,
                source,
                mastered: lists.mastered,
                learning: lists.learning,
            })
            .into_response())
        }
    }
}

pub async fn post_word_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<StatusBody>,
) -> Result<impl IntoResponse, AppError> {
    let word = body
        .word
        .ok_or_else(|| AppError::validation("word is required"))?;
    let source = body
        .source
        .as_deref()
        .map(parse_source)
        .transpose()?
        .unwrap_or(Source::Oxford);
    let is_correct = body
        .is_correct
        .ok_or_else(|| AppError::validation("isCorrect is required"))?;

    let outcome: RecordOutcome =
        word_status::record_answer(state.db(), &user.id, source, &word, is_correct).await?;
    Ok(SuccessResponse::new(outcome))
}
