use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State},
};
use serde::{Deserialize, Serialize};

use crate::{app_state::AppState, auth, db::models::NewLoginAttempt, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// Every attempt, successful or not, writes exactly one audit record with a
/// human-readable reason.
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let ip = addr.ip().to_string();
    let username = req.username.as_deref().filter(|s| !s.is_empty());
    let password = req.password.as_deref().filter(|s| !s.is_empty());

    let (Some(username), Some(password)) = (username, password) else {
        audit(&state, req.username.as_deref(), &ip, false, "missing parameters").await;
        return Err(ApiError::BadRequest("missing parameters".to_string()));
    };

    let user = match state.users.find_by_username(username).await {
        Ok(user) => user,
        Err(err) => {
            tracing::error!("user lookup failed: {err}");
            audit(&state, Some(username), &ip, false, "database error").await;
            return Err(ApiError::Internal("database error".to_string()));
        }
    };

    let Some(user) = user else {
        audit(&state, Some(username), &ip, false, "user not found").await;
        return Err(ApiError::Unauthorized("user not found".to_string()));
    };

    if !auth::verify_password(password, &user.password_hash) {
        audit(&state, Some(username), &ip, false, "invalid password").await;
        return Err(ApiError::Unauthorized("invalid password".to_string()));
    }

    audit(&state, Some(username), &ip, true, "success").await;

    let token = auth::issue_token(&state.config.jwt_secret, user.id, &user.role)
        .map_err(|err| ApiError::Internal(format!("token issuance failed: {err}")))?;

    Ok(Json(TokenResponse { token }))
}

/// Audit writes never change the response; a failure is only logged.
async fn audit(state: &AppState, username: Option<&str>, ip: &str, success: bool, message: &str) {
    let attempt = NewLoginAttempt {
        username: username.map(str::to_owned),
        ip: ip.to_string(),
        success,
        message: message.to_string(),
    };
    if let Err(err) = state.audit.record(attempt).await {
        tracing::error!("failed to record login attempt: {err}");
    }
}
