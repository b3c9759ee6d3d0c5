//! The payer -> merchant balance transfer pipeline.
//!
//! A linear sequence of terminal steps: resolve payer by NFC token, check
//! PIN, decrypt, check funds, resolve merchant, decrypt, recompute, re-encrypt
//! and write back. No retries, no transaction spanning the two writes. The
//! payer debit uses a compare-and-swap on the prior ciphertext; the merchant
//! credit is a plain write, and if it fails the payer stays debited (see
//! DESIGN.md for both choices).

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    crypto::{self, BalanceKey},
    store::AccountStore,
};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("payer account not found")]
    PayerNotFound,
    #[error("merchant account not found")]
    MerchantNotFound,
    #[error("invalid PIN")]
    InvalidPin,
    #[error("insufficient funds on payer account")]
    InsufficientFunds,
    #[error("payer balance changed concurrently")]
    Conflict,
    #[error("balance arithmetic overflow")]
    Overflow,
    #[error("balance cipher failure: {0}")]
    Cipher(String),
    #[error("database failure: {0}")]
    Database(String),
}

#[derive(Debug)]
pub struct TransferRequest<'a> {
    pub amount: Decimal,
    pub pin: &'a str,
    pub nfc_token: &'a str,
    pub merchant_user_id: i64,
}

fn cipher_err(err: anyhow::Error) -> TransferError {
    TransferError::Cipher(err.to_string())
}

fn db_err(err: anyhow::Error) -> TransferError {
    TransferError::Database(err.to_string())
}

pub async fn transfer<S: AccountStore + ?Sized>(
    store: &S,
    req: TransferRequest<'_>,
) -> Result<(), TransferError> {
    let payer = store
        .payer_by_nfc_token(req.nfc_token)
        .await
        .map_err(db_err)?
        .ok_or(TransferError::PayerNotFound)?;

    // plaintext PIN comparison, as stored
    if req.pin != payer.pin {
        return Err(TransferError::InvalidPin);
    }

    let payer_key = BalanceKey::from_hex(&payer.secret_key).map_err(cipher_err)?;
    let payer_balance =
        crypto::decrypt_balance(&payer_key, &payer.encrypted_balance).map_err(cipher_err)?;

    if payer_balance < req.amount {
        return Err(TransferError::InsufficientFunds);
    }

    let merchant = store
        .merchant_by_user_id(req.merchant_user_id)
        .await
        .map_err(db_err)?
        .ok_or(TransferError::MerchantNotFound)?;

    let merchant_key = BalanceKey::from_hex(&merchant.secret_key).map_err(cipher_err)?;
    let merchant_balance =
        crypto::decrypt_balance(&merchant_key, &merchant.encrypted_balance).map_err(cipher_err)?;

    // checked arithmetic: a stored balance near Decimal::MAX must surface as
    // an error, not panic the request task
    let new_payer_balance = payer_balance
        .checked_sub(req.amount)
        .ok_or(TransferError::Overflow)?;
    let new_merchant_balance = merchant_balance
        .checked_add(req.amount)
        .ok_or(TransferError::Overflow)?;

    let new_payer_ct = crypto::encrypt_balance(&payer_key, new_payer_balance).map_err(cipher_err)?;
    let new_merchant_ct =
        crypto::encrypt_balance(&merchant_key, new_merchant_balance).map_err(cipher_err)?;

    let debited = store
        .update_balance_if_unchanged(payer.account_id, &new_payer_ct, &payer.encrypted_balance)
        .await
        .map_err(db_err)?;
    if !debited {
        return Err(TransferError::Conflict);
    }

    if let Err(err) = store.update_balance(merchant.account_id, &new_merchant_ct).await {
        // The payer is already debited at this point and is not rolled back.
        tracing::error!(
            account_id = merchant.account_id,
            "merchant credit failed after payer debit: {err}"
        );
        return Err(TransferError::Database(err.to_string()));
    }

    // History entry recording would go here; out of scope.

    Ok(())
}
