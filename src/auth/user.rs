use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::MAX_USERNAME_LENGTH;
use crate::error::{AuthorityError, Result};

/// A registered user as held by the user store
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user identifier
    pub id: Uuid,
    /// Unique login name, embedded as the token subject
    pub username: String,
    /// Opaque credential produced by the credential verifier
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Creates a new identity with a fresh id
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Usernames become token subjects and log fields, so keep them printable and bounded
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(AuthorityError::ValidationError("Username must not be empty".to_string()));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthorityError::ValidationError(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }

    if username.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(AuthorityError::ValidationError(
            "Username contains whitespace or control characters".to_string(),
        ));
    }

    Ok(())
}
