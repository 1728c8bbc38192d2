use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{self, AuthError};
use crate::response::AppError;
use crate::state::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = auth::extract_token(req.headers()) else {
        return AppError::unauthorized("Missing bearer token").into_response();
    };

    let Some(secret) = state.config().auth_jwt_secret.as_deref() else {
        tracing::error!("AUTH_JWT_SECRET is not configured");
        return AppError::unavailable("Authentication is not configured").into_response();
    };

    match auth::verify_access_token(&token, secret) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(AuthError::Expired) => {
            AppError::unauthorized("Session expired, please sign in again").into_response()
        }
        Err(err) => {
            tracing::debug!(error = %err, "rejected access token");
            AppError::unauthorized("Authentication failed, please sign in again").into_response()
        }
    }
}
