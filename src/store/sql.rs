use anyhow::Result;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

use crate::{
    db::{
        models::{MerchantAccount, NewLoginAttempt, PayerAccount, User},
        queries,
    },
    store::{AccountStore, LoginAuditStore, UserStore},
};

/// MySQL-backed implementation of all three stores, sharing one pool.
pub struct SqlStore {
    pool: Pool<MySql>,
}

impl SqlStore {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqlStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        queries::get_user_by_username(&self.pool, username).await
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        queries::list_users(&self.pool).await
    }
}

#[async_trait]
impl AccountStore for SqlStore {
    async fn payer_by_nfc_token(&self, nfc_token: &str) -> Result<Option<PayerAccount>> {
        queries::get_payer_by_nfc_token(&self.pool, nfc_token).await
    }

    async fn merchant_by_user_id(&self, user_id: i64) -> Result<Option<MerchantAccount>> {
        queries::get_merchant_by_user_id(&self.pool, user_id).await
    }

    async fn update_balance(&self, account_id: i64, new_encrypted: &[u8]) -> Result<()> {
        queries::update_account_balance(&self.pool, account_id, new_encrypted).await
    }

    async fn update_balance_if_unchanged(
        &self,
        account_id: i64,
        new_encrypted: &[u8],
        prior_encrypted: &[u8],
    ) -> Result<bool> {
        queries::update_account_balance_if_unchanged(
            &self.pool,
            account_id,
            new_encrypted,
            prior_encrypted,
        )
        .await
    }
}

#[async_trait]
impl LoginAuditStore for SqlStore {
    async fn record(&self, attempt: NewLoginAttempt) -> Result<()> {
        queries::insert_login_attempt(
            &self.pool,
            attempt.username.as_deref(),
            &attempt.ip,
            attempt.success,
            &attempt.message,
        )
        .await
    }
}
