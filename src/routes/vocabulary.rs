use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use bytes::Bytes;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db::operations::vocabulary;
use crate::response::{AppError, SuccessResponse};
use crate::services::csv_import;
use crate::state::AppState;

#[derive(Serialize)]
struct ImportResponse {
    success: bool,
    imported: usize,
    skipped: usize,
}

/// Accepts a raw CSV body of `term,meaning` rows.
pub async fn import_csv(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let text = std::str::from_utf8(&body)
        .map_err(|_| AppError::validation("CSV body must be UTF-8 text"))?;
    let sheet = csv_import::parse_sheet(text).map_err(|err| AppError::validation(err.to_string()))?;

    let imported = vocabulary::upsert_entries(state.db(), &user.id, &sheet.rows).await?;
    tracing::info!(user_id = %user.id, imported, skipped = sheet.skipped, "vocabulary imported");

    Ok(Json(ImportResponse {
        success: true,
        imported,
        skipped: sheet.skipped,
    }))
}

pub async fn list_vocabulary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let entries = vocabulary::list_entries(state.db(), &user.id).await?;
    Ok(SuccessResponse::new(entries))
}
