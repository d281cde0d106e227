//! Security module: password hashing and admin session tokens

mod file_storage;
mod hashing;

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

pub use hashing::HashingManager;

/// Length of a session token in bytes before hex encoding
const SESSION_TOKEN_BYTES: usize = 32;

/// Security manager combining hashing and token handling
pub struct SecurityManager {
    hashing: HashingManager,
}

impl SecurityManager {
    /// Create a security manager whose pepper lives under `config_dir`
    pub fn new(config_dir: PathBuf) -> Result<Self> {
        let storage = file_storage::FileStorage::new(config_dir);
        let pepper = storage.get_or_create_pepper()?;

        Ok(Self::with_pepper(&pepper))
    }

    /// Create a security manager from an explicit pepper
    pub fn with_pepper(pepper: &[u8]) -> Self {
        Self {
            hashing: HashingManager::new(pepper),
        }
    }

    // ========== Hashing ==========

    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.hashing.hash_password(password)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        self.hashing.verify_password(password, hash)
    }

    // ========== Session Tokens ==========

    /// Random 64-character hex bearer token
    pub fn generate_session_token(&self) -> String {
        use rand::RngCore;
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// SHA-256 hex digest of a token; only digests are kept in the session store
    pub fn hash_token(&self, token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tokens_are_random_hex() {
        let security = SecurityManager::with_pepper(&HashingManager::generate_pepper());

        let a = security.generate_session_token();
        let b = security.generate_session_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_hash_is_stable_and_distinct() {
        let security = SecurityManager::with_pepper(&HashingManager::generate_pepper());

        let token = security.generate_session_token();
        assert_eq!(security.hash_token(&token), security.hash_token(&token));
        assert_ne!(security.hash_token(&token), token);
        assert_eq!(security.hash_token(&token).len(), 64);
    }

    #[test]
    fn test_password_round_trip_through_manager() {
        let dir = tempfile::tempdir().unwrap();
        let security = SecurityManager::new(dir.path().to_path_buf()).unwrap();

        let hash = security.hash_password("Admin#2024").unwrap();

        // A second manager over the same directory reuses the pepper
        let reopened = SecurityManager::new(dir.path().to_path_buf()).unwrap();
        assert!(reopened.verify_password("Admin#2024", &hash).unwrap());
    }
}
