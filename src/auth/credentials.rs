//! Password hashing capability
//!
//! The authority never sees how credentials are stored; it only asks a
//! [`CredentialVerifier`] to hash and to compare.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;

use crate::error::{AuthorityError, Result};

/// Trait for credential hashing backends
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Hash a plaintext password into an opaque string
    async fn hash(&self, plain: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash
    async fn matches(&self, plain: &str, hashed: &str) -> Result<bool>;
}

/// Argon2id verifier. Hashing runs on the blocking pool.
#[derive(Default)]
pub struct Argon2Verifier;

impl Argon2Verifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialVerifier for Argon2Verifier {
    async fn hash(&self, plain: &str) -> Result<String> {
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(plain.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthorityError::SystemError(format!("Password hashing failed: {}", e)))
        })
        .await?
    }

    async fn matches(&self, plain: &str, hashed: &str) -> Result<bool> {
        let plain = plain.to_string();
        let hashed = hashed.to_string();
        tokio::task::spawn_blocking(move || {
            // A stored hash we cannot parse never matches
            let parsed = match PasswordHash::new(&hashed) {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::warn!("Stored credential is not a valid PHC string: {}", e);
                    return Ok(false);
                }
            };
            Ok(Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_match() {
        let verifier = Argon2Verifier::new();
        let hashed = verifier.hash("pw123").await.unwrap();

        assert_ne!(hashed, "pw123");
        assert!(hashed.starts_with("$argon2id$"));
        assert!(verifier.matches("pw123", &hashed).await.unwrap());
        assert!(!verifier.matches("pw124", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let verifier = Argon2Verifier::new();
        let first = verifier.hash("same").await.unwrap();
        let second = verifier.hash("same").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_garbage_hash_does_not_match() {
        let verifier = Argon2Verifier::new();
        assert!(!verifier.matches("pw", "not-a-hash").await.unwrap());
    }
}
