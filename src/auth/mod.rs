use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{app_state::AppState, error::ApiError};

/// Tokens are valid for one hour.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Bearer token claims. The user id lives in an `id` claim rather than `sub`,
/// matching the payload shape the demo clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("malformed authorization header")]
    MalformedToken,
    #[error("invalid or expired token")]
    InvalidToken,
}

pub fn issue_token(secret: &str, user_id: i64, role: &str) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        id: user_id,
        role: role.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Verify an `Authorization` header of the shape `<scheme> <token>`. Only
/// the two-part shape is enforced; the scheme itself is not inspected.
pub fn verify_bearer(secret: &str, header: Option<&str>) -> Result<Claims, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    match header.split_once(' ') {
        Some((_scheme, token)) if !token.is_empty() => verify_token(secret, token),
        _ => Err(AuthError::MalformedToken),
    }
}

/// Compare a candidate password against a stored bcrypt hash. A comparison
/// error counts as a mismatch.
pub fn verify_password(candidate: &str, hash: &str) -> bool {
    bcrypt::verify(candidate, hash).unwrap_or(false)
}

/// Middleware guarding protected routes: verifies the bearer token and
/// attaches the decoded claims as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let claims = verify_bearer(&state.config.jwt_secret, header)
        .map_err(|err| ApiError::Unauthorized(err.to_string()))?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
