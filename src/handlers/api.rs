use axum::{Json, extract::State};

use crate::{app_state::AppState, db::models::User, error::ApiError};

/// GET /api
pub async fn health() -> &'static str {
    "API is working"
}

/// GET /api/auth
///
/// Returns every user row unfiltered, password hash and PIN included. A
/// known information-exposure weakness, kept deliberately; see DESIGN.md
/// before "fixing" it.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.list_all().await.map_err(|err| {
        tracing::error!("user listing failed: {err}");
        ApiError::Internal("database error".to_string())
    })?;

    Ok(Json(users))
}
