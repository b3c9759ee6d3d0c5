use serde::{Deserialize, Serialize};

/// A user row, serialized as-is by `GET /api/auth` -- including the password
/// hash and PIN. A known information-exposure weakness of that endpoint,
/// kept deliberately; see DESIGN.md.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub pin: String,
}

/// Payer projection: the account matched by NFC token, joined to its owning
/// user for the PIN.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PayerAccount {
    pub account_id: i64,
    pub encrypted_balance: Vec<u8>,
    pub secret_key: String,
    pub pin: String,
    pub user_id: i64,
}

/// Merchant projection: the account credited in a transaction, matched by
/// its owning user id.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MerchantAccount {
    pub account_id: i64,
    pub encrypted_balance: Vec<u8>,
    pub secret_key: String,
}

/// One login attempt, written for every call to `POST /api/login` regardless
/// of outcome. Append-only; never read back by the API.
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub username: Option<String>,
    pub ip: String,
    pub success: bool,
    pub message: String,
}
