//! Claim sets and their canonical byte encoding

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{AuthorityError, Result, TokenError};

/// Which operations a token is allowed to authorize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, authorizes resource requests
    Access,
    /// Long-lived, only authorizes minting new access tokens
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

impl std::str::FromStr for TokenKind {
    type Err = AuthorityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            other => Err(AuthorityError::ValidationError(format!(
                "Unknown token kind '{}'",
                other
            ))),
        }
    }
}

/// Claims carried by a token.
///
/// Field order is the wire order; the signature covers the exact encoding, so
/// reordering fields here changes every token ever issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimSet {
    /// Subject (username)
    #[serde(rename = "sub")]
    pub subject: String,
    /// Issued at (epoch seconds)
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration time (epoch seconds)
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "knd")]
    pub kind: TokenKind,
    /// Unique token id, used to correlate log lines
    #[serde(rename = "jti")]
    pub token_id: Uuid,
}

impl ClaimSet {
    /// Creates claims valid for `ttl_secs` starting at `issued_at`
    pub fn new(subject: String, kind: TokenKind, issued_at: i64, ttl_secs: i64) -> Result<Self> {
        let claims = Self {
            subject,
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
            kind,
            token_id: Uuid::new_v4(),
        };
        claims.check().map_err(|e| AuthorityError::ValidationError(e.to_string()))?;
        Ok(claims)
    }

    /// Expired when `now` has reached `expires_at + skew_secs`
    pub fn is_expired_at(&self, now: i64, skew_secs: i64) -> bool {
        now >= self.expires_at.saturating_add(skew_secs)
    }

    /// Seconds of validity from issue to expiry
    pub fn lifetime_secs(&self) -> i64 {
        self.expires_at - self.issued_at
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.issued_at, 0).single()
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at, 0).single()
    }

    fn check(&self) -> std::result::Result<(), TokenError> {
        if self.subject.is_empty() {
            return Err(TokenError::Malformed("empty subject".to_string()));
        }
        if self.issued_at < 0 || self.issued_at_utc().is_none() || self.expires_at_utc().is_none() {
            return Err(TokenError::Malformed("timestamp out of range".to_string()));
        }
        if self.expires_at <= self.issued_at {
            return Err(TokenError::Malformed("expiry is not after issue time".to_string()));
        }
        Ok(())
    }
}

/// Canonical encoding of claim sets
pub struct ClaimsCodec;

impl ClaimsCodec {
    /// Serializes claims to compact JSON in fixed key order
    pub fn encode(claims: &ClaimSet) -> Result<Vec<u8>> {
        serde_json::to_vec(claims)
            .map_err(|e| AuthorityError::SystemError(format!("Failed to encode claims: {}", e)))
    }

    /// Parses claims, rejecting anything that is not a well-formed claim set
    pub fn decode(bytes: &[u8]) -> std::result::Result<ClaimSet, TokenError> {
        let claims: ClaimSet = serde_json::from_slice(bytes)
            .map_err(|e| TokenError::Malformed(format!("invalid claims: {}", e)))?;
        claims.check()?;
        Ok(claims)
    }
}
