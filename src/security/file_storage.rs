//! File-based secret storage
//!
//! Persists the password pepper in `<data_dir>/secrets.dat` so admin password
//! hashes stay verifiable across restarts.

use crate::error::{AppError, Result};
use base64::Engine;
use std::fs;
use std::path::PathBuf;

const SECRETS_FILE: &str = "secrets.dat";
const PEPPER_SIZE: usize = 32;

/// File-based storage for app secrets
pub struct FileStorage {
    config_dir: PathBuf,
}

impl FileStorage {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Load the pepper, generating and saving one on first start
    pub fn get_or_create_pepper(&self) -> Result<Vec<u8>> {
        let secrets_path = self.config_dir.join(SECRETS_FILE);

        if secrets_path.exists() {
            let data = fs::read_to_string(&secrets_path)
                .map_err(|e| AppError::Config(format!("Failed to read secrets: {}", e)))?;

            return self.decode_pepper(data.trim());
        }

        use rand::RngCore;
        let mut pepper = vec![0u8; PEPPER_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut pepper);

        fs::create_dir_all(&self.config_dir)
            .map_err(|e| AppError::Config(format!("Failed to create config dir: {}", e)))?;

        fs::write(&secrets_path, self.encode_pepper(&pepper))
            .map_err(|e| AppError::Config(format!("Failed to write secrets: {}", e)))?;

        tracing::info!("Generated new password pepper at {:?}", secrets_path);
        Ok(pepper)
    }

    /// base64(xor(pepper, obfuscation_key))
    fn encode_pepper(&self, pepper: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.obfuscate(pepper))
    }

    fn decode_pepper(&self, data: &str) -> Result<Vec<u8>> {
        let obfuscated = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| AppError::Config(format!("Failed to decode pepper: {}", e)))?;

        if obfuscated.len() != PEPPER_SIZE {
            return Err(AppError::Config("Invalid secrets format".to_string()));
        }

        Ok(self.obfuscate(&obfuscated))
    }

    fn obfuscate(&self, bytes: &[u8]) -> Vec<u8> {
        const OBFUSCATION_KEY: &[u8] = b"FinDiag-Risk-Diagnosis-v1-Pepper";
        bytes
            .iter()
            .zip(OBFUSCATION_KEY.iter().cycle())
            .map(|(a, b)| a ^ b)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pepper_is_persisted() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());

        let first = storage.get_or_create_pepper().unwrap();
        let second = storage.get_or_create_pepper().unwrap();

        assert_eq!(first.len(), PEPPER_SIZE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_corrupt_secrets_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SECRETS_FILE), "not base64!").unwrap();

        let storage = FileStorage::new(dir.path().to_path_buf());
        assert!(matches!(
            storage.get_or_create_pepper(),
            Err(AppError::Config(_))
        ));
    }
}
