use anyhow::Result;
use sqlx::{MySql, Pool};

use crate::db::models::{MerchantAccount, PayerAccount, User};

pub async fn get_user_by_username(pool: &Pool<MySql>, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role, pin FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_users(pool: &Pool<MySql>) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role, pin FROM users",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn insert_login_attempt(
    pool: &Pool<MySql>,
    username: Option<&str>,
    ip: &str,
    success: bool,
    message: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO login_attempts (username, ip, attempt_time, success, message)
         VALUES (?, ?, NOW(), ?, ?)",
    )
    .bind(username)
    .bind(ip)
    .bind(success)
    .bind(message)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_payer_by_nfc_token(
    pool: &Pool<MySql>,
    nfc_token: &str,
) -> Result<Option<PayerAccount>> {
    let payer = sqlx::query_as::<_, PayerAccount>(
        "SELECT a.account_id, a.encrypted_balance, a.secret_key, u.pin, u.id AS user_id
         FROM accounts a
         INNER JOIN users u ON u.id = a.user_id
         WHERE a.nfc_token = ?",
    )
    .bind(nfc_token)
    .fetch_optional(pool)
    .await?;

    Ok(payer)
}

pub async fn get_merchant_by_user_id(
    pool: &Pool<MySql>,
    user_id: i64,
) -> Result<Option<MerchantAccount>> {
    let merchant = sqlx::query_as::<_, MerchantAccount>(
        "SELECT account_id, encrypted_balance, secret_key FROM accounts WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(merchant)
}

pub async fn update_account_balance(
    pool: &Pool<MySql>,
    account_id: i64,
    new_encrypted: &[u8],
) -> Result<()> {
    sqlx::query("UPDATE accounts SET encrypted_balance = ? WHERE account_id = ?")
        .bind(new_encrypted)
        .bind(account_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Conditional balance write: succeeds only if the stored ciphertext is still
/// the one the caller read. Returns false when a concurrent writer got there
/// first.
pub async fn update_account_balance_if_unchanged(
    pool: &Pool<MySql>,
    account_id: i64,
    new_encrypted: &[u8],
    prior_encrypted: &[u8],
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE accounts SET encrypted_balance = ?
         WHERE account_id = ? AND encrypted_balance = ?",
    )
    .bind(new_encrypted)
    .bind(account_id)
    .bind(prior_encrypted)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
