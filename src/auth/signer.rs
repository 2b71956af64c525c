//! Keyed message authentication over encoded claims

use ring::hmac;

use crate::constants::MIN_SIGNING_KEY_LENGTH;
use crate::error::{AuthorityError, Result};

/// HMAC-SHA256 signer. The key is fixed for the life of the value.
pub struct Signer {
    key: hmac::Key,
}

impl Signer {
    /// Creates a signer. Fails if the key is missing or too short.
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(AuthorityError::ConfigError(
                "Signing key is not set".to_string(),
            ));
        }
        if secret.len() < MIN_SIGNING_KEY_LENGTH {
            return Err(AuthorityError::ConfigError(format!(
                "Signing key must be at least {} bytes, got {}",
                MIN_SIGNING_KEY_LENGTH,
                secret.len()
            )));
        }

        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        })
    }

    /// Computes the tag for `message`
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        hmac::sign(&self.key, message).as_ref().to_vec()
    }

    /// Constant-time tag check. Any malformed or truncated tag is just `false`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        hmac::verify(&self.key, message, signature).is_ok()
    }
}
