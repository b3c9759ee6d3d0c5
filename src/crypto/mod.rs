use std::fmt;
use std::str::FromStr;

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// A 32-byte per-account balance key.
///
/// Stored hex-encoded in the same row as the ciphertext it protects, which
/// defeats confidentiality against anyone with database access. A deliberate
/// weakness (see DESIGN.md); callers only see this interface, so a real
/// key-management scheme could replace the storage without touching them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceKey([u8; 32]);

impl BalanceKey {
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(anyhow!("balance key must be 32 bytes"));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Encrypt a balance with AES-256-GCM under the account's own key.
///
/// Output is `nonce || ciphertext+tag` with a fresh random 96-bit nonce, so
/// two encryptions of the same balance produce different bytes.
pub fn encrypt_balance(key: &BalanceKey, balance: Decimal) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| anyhow!("invalid key length: {e:?}"))?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, balance.to_string().as_bytes())
        .map_err(|_| anyhow!("balance encryption failed"))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(nonce.as_slice());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a stored balance. Fails on short input, a wrong key, a tampered
/// ciphertext, or a plaintext that does not parse as a decimal; the error is
/// a value, never a panic.
pub fn decrypt_balance(key: &BalanceKey, data: &[u8]) -> Result<Decimal> {
    if data.len() <= NONCE_LEN {
        return Err(anyhow!("encrypted balance too short"));
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| anyhow!("invalid key length: {e:?}"))?;
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| anyhow!("balance decryption failed"))?;

    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| anyhow!("decrypted balance is not valid UTF-8"))?;
    Decimal::from_str(text).map_err(|e| anyhow!("decrypted balance is not a decimal: {e}"))
}
