use axum::{Extension, Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    auth::Claims,
    error::ApiError,
    transfer::{self, TransferRequest},
};

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub amount: Option<Decimal>,
    pub pin: Option<String>,
    #[serde(rename = "nfcData")]
    pub nfc_data: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub message: String,
}

/// POST /api/transaction (bearer-protected)
///
/// The merchant identity is taken from the request body's `user_id`, not from
/// the verified claims; the caller is deliberately not cross-checked against
/// the merchant account (see DESIGN.md).
pub async fn transaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TransactionRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let amount = req
        .amount
        .filter(|a| a.is_sign_positive() && !a.is_zero());
    let pin = req.pin.as_deref().filter(|s| !s.is_empty());
    let nfc_token = req.nfc_data.as_deref().filter(|s| !s.is_empty());

    let (Some(amount), Some(pin), Some(nfc_token), Some(merchant_user_id)) =
        (amount, pin, nfc_token, req.user_id)
    else {
        return Err(ApiError::BadRequest("missing parameters".to_string()));
    };

    tracing::debug!(
        caller = claims.id,
        merchant = merchant_user_id,
        %amount,
        "processing transaction"
    );

    transfer::transfer(
        state.accounts.as_ref(),
        TransferRequest {
            amount,
            pin,
            nfc_token,
            merchant_user_id,
        },
    )
    .await?;

    Ok(Json(TransactionResponse {
        message: "transaction completed successfully".to_string(),
    }))
}
