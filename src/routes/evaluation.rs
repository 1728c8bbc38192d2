use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::services::evaluation::{self, SentenceRequest, Verdict};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBody {
    word: Option<String>,
    user_input: Option<String>,
    meaning: Option<String>,
}

#[derive(Serialize)]
struct EvaluateResponse {
    success: bool,
    #[serde(flatten)]
    verdict: Verdict,
}

impl EvaluateBody {
    fn validate(&self) -> Result<SentenceRequest<'_>, AppError> {
        let word = required(self.word.as_deref(), "word is required")?;
        let user_input = required(self.user_input.as_deref(), "userInput is required")?;
        Ok(SentenceRequest {
            word,
            user_input,
            meaning: self.meaning.as_deref(),
        })
    }
}

fn required<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(message))
}

pub async fn evaluate_simple(
    State(state): State<AppState>,
    Json(body): Json<EvaluateBody>,
) -> Result<impl IntoResponse, AppError> {
    let request = body.validate()?;
    let verdict = evaluation::evaluate_simple(state.llm(), &request)
        .await
        .map_err(|err| {
            tracing::warn!(word = request.word, error = %err, "sentence evaluation failed");
            AppError::upstream("AI evaluation failed")
        })?;

    Ok(Json(EvaluateResponse {
        success: true,
        verdict,
    }))
}

/// Older JSON-mode endpoint. Never fails on provider errors.
pub async fn evaluate_strict(
    State(state): State<AppState>,
    Json(body): Json<EvaluateBody>,
) -> Result<impl IntoResponse, AppError> {
    let request = body.validate()?;
    let verdict = evaluation::evaluate_strict(state.llm(), &request).await;
    Ok(Json(EvaluateResponse {
        success: true,
        verdict,
    }))
}
