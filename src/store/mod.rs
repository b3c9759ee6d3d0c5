pub mod sql;

use anyhow::Result;
use async_trait::async_trait;

use crate::db::models::{MerchantAccount, NewLoginAttempt, PayerAccount, User};

/// Read access to the credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list_all(&self) -> Result<Vec<User>>;
}

/// Account lookups and balance writes used by the transfer pipeline.
///
/// `update_balance_if_unchanged` is a compare-and-swap on the prior
/// ciphertext; the pipeline uses it for the payer debit so concurrent debits
/// fail instead of silently losing an update.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn payer_by_nfc_token(&self, nfc_token: &str) -> Result<Option<PayerAccount>>;
    async fn merchant_by_user_id(&self, user_id: i64) -> Result<Option<MerchantAccount>>;
    async fn update_balance(&self, account_id: i64, new_encrypted: &[u8]) -> Result<()>;
    async fn update_balance_if_unchanged(
        &self,
        account_id: i64,
        new_encrypted: &[u8],
        prior_encrypted: &[u8],
    ) -> Result<bool>;
}

/// Append-only login audit log.
#[async_trait]
pub trait LoginAuditStore: Send + Sync {
    async fn record(&self, attempt: NewLoginAttempt) -> Result<()>;
}

#[cfg(test)]
pub mod memory {
    //! In-memory store double used by the transfer and handler tests.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::{Result, anyhow};
    use async_trait::async_trait;

    use super::{AccountStore, LoginAuditStore, UserStore};
    use crate::db::models::{MerchantAccount, NewLoginAttempt, PayerAccount, User};

    #[derive(Debug, Clone)]
    pub struct AccountRecord {
        pub account_id: i64,
        pub user_id: i64,
        pub encrypted_balance: Vec<u8>,
        pub secret_key: String,
        pub nfc_token: String,
        pub pin: String,
    }

    #[derive(Default)]
    pub struct MemoryStore {
        pub users: Vec<User>,
        pub accounts: Mutex<Vec<AccountRecord>>,
        pub attempts: Mutex<Vec<NewLoginAttempt>>,
        /// When set, merchant-side balance writes fail. Used to exercise the
        /// debited-but-not-credited failure path.
        pub fail_plain_writes: AtomicBool,
        /// When set, conditional balance writes report a lost race, as if a
        /// concurrent writer updated the row first.
        pub fail_conditional_writes: AtomicBool,
        /// When set, user reads fail. Drives the database-error paths.
        pub fail_reads: AtomicBool,
    }

    impl MemoryStore {
        pub fn encrypted_balance(&self, account_id: i64) -> Vec<u8> {
            self.accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.account_id == account_id)
                .map(|a| a.encrypted_balance.clone())
                .unwrap()
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(anyhow!("simulated read failure"));
            }
            Ok(self.users.iter().find(|u| u.username == username).cloned())
        }

        async fn list_all(&self) -> Result<Vec<User>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(anyhow!("simulated read failure"));
            }
            Ok(self.users.clone())
        }
    }

    #[async_trait]
    impl AccountStore for MemoryStore {
        async fn payer_by_nfc_token(&self, nfc_token: &str) -> Result<Option<PayerAccount>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.nfc_token == nfc_token)
                .map(|a| PayerAccount {
                    account_id: a.account_id,
                    encrypted_balance: a.encrypted_balance.clone(),
                    secret_key: a.secret_key.clone(),
                    pin: a.pin.clone(),
                    user_id: a.user_id,
                }))
        }

        async fn merchant_by_user_id(&self, user_id: i64) -> Result<Option<MerchantAccount>> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.user_id == user_id)
                .map(|a| MerchantAccount {
                    account_id: a.account_id,
                    encrypted_balance: a.encrypted_balance.clone(),
                    secret_key: a.secret_key.clone(),
                }))
        }

        async fn update_balance(&self, account_id: i64, new_encrypted: &[u8]) -> Result<()> {
            if self.fail_plain_writes.load(Ordering::SeqCst) {
                return Err(anyhow!("simulated write failure"));
            }
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .iter_mut()
                .find(|a| a.account_id == account_id)
                .ok_or_else(|| anyhow!("no such account"))?;
            account.encrypted_balance = new_encrypted.to_vec();
            Ok(())
        }

        async fn update_balance_if_unchanged(
            &self,
            account_id: i64,
            new_encrypted: &[u8],
            prior_encrypted: &[u8],
        ) -> Result<bool> {
            if self.fail_conditional_writes.load(Ordering::SeqCst) {
                return Ok(false);
            }
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts
                .iter_mut()
                .find(|a| a.account_id == account_id)
                .ok_or_else(|| anyhow!("no such account"))?;
            if account.encrypted_balance != prior_encrypted {
                return Ok(false);
            }
            account.encrypted_balance = new_encrypted.to_vec();
            Ok(true)
        }
    }

    #[async_trait]
    impl LoginAuditStore for MemoryStore {
        async fn record(&self, attempt: NewLoginAttempt) -> Result<()> {
            self.attempts.lock().unwrap().push(attempt);
            Ok(())
        }
    }
}
