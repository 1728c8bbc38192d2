use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db::operations::progress::{self, ProgressAttempt, ProgressFilter};
use crate::models::Source;
use crate::response::{AppError, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    source: Option<String>,
    word: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressBody {
    word: Option<String>,
    word_meaning: Option<String>,
    source: Option<String>,
    topic: Option<String>,
    is_correct: Option<bool>,
    ai_feedback: Option<String>,
}

pub async fn list_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ProgressQuery>,
) -> Result<impl IntoResponse, AppError> {
    let source = query
        .source
        .as_deref()
        .map(parse_source)
        .transpose()?;
    let word = query.word.as_deref().map(str::trim).filter(|w| !w.is_empty());

    let filter = ProgressFilter { source, word };
    let rows = progress::list_progress(state.db(), &user.id, &filter).await?;
    Ok(SuccessResponse::new(rows))
}

pub async fn record_progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ProgressBody>,
) -> Result<impl IntoResponse, AppError> {
    let word = body
        .word
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .ok_or_else(|| AppError::validation("word is required"))?;
    let source = body
        .source
        .as_deref()
        .map(parse_source)
        .transpose()?
        .ok_or_else(|| AppError::validation("source is required"))?;
    let is_correct = body
        .is_correct
        .ok_or_else(|| AppError::validation("isCorrect is required"))?;

    let attempt = ProgressAttempt {
        word,
        word_meaning: non_blank(body.word_meaning.as_deref()),
        source,
        topic: non_blank(body.topic.as_deref()),
        is_correct,
        ai_feedback: non_blank(body.ai_feedback.as_deref()),
    };

    let record = progress::record_attempt(state.db(), &user.id, &attempt).await?;
    tracing::debug!(
        user_id = %user.id,
        word,
        %source,
        attempts = record.attempts,
        "progress recorded"
    );
    Ok(SuccessResponse::new(record))
}

pub(crate) fn parse_source(raw: &str) -> Result<Source, AppError> {
    raw.parse::<Source>().map_err(AppError::validation)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
