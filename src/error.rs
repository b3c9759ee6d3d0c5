use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::transfer::TransferError;

/// API-level failure taxonomy. Every failure is converted to a response at
/// its point of occurrence; nothing propagates to a global handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("insufficient funds on payer account")]
    InsufficientFunds,
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InsufficientFunds => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::PayerNotFound | TransferError::MerchantNotFound => {
                ApiError::NotFound(err.to_string())
            }
            TransferError::InvalidPin => ApiError::Unauthorized(err.to_string()),
            TransferError::InsufficientFunds => ApiError::InsufficientFunds,
            TransferError::Conflict
            | TransferError::Overflow
            | TransferError::Cipher(_)
            | TransferError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}
