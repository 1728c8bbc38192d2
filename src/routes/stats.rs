use axum::extract::State;
use axum::response::IntoResponse;
use axum::Extension;

use crate::auth::AuthUser;
use crate::response::{AppError, SuccessResponse};
use crate::services::word_status;
use crate::state::AppState;

/// Mastered and learning counts per source, derived from the stored strings.
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let summary = word_status::stats(state.db(), &user.id).await?;
    Ok(SuccessResponse::new(summary))
}
