use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use std::time::Duration;

use crate::auth::claims::{ClaimSet, ClaimsCodec, TokenKind};
use crate::auth::signer::Signer;
use crate::config::AuthorityConfig;
use crate::constants::{MAX_TOKEN_LENGTH, TOKEN_SEGMENT_SEPARATOR};
use crate::error::{AuthorityError, Result, TokenError};

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: ClaimSet,
}

/// Issues and validates signed access and refresh tokens.
///
/// Stateless after construction: the signer key and lifetimes never change, so a
/// single provider can be shared across tasks behind an `Arc`.
pub struct TokenProvider {
    signer: Signer,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock_skew: Duration,
}

impl TokenProvider {
    /// Creates a token provider from validated configuration
    pub fn new(config: &AuthorityConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            signer: Signer::new(config.signing_key.as_bytes())?,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            clock_skew: config.clock_skew_tolerance,
        })
    }

    /// Lifetime applied to newly issued tokens of `kind`
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    pub fn issue_access_token(&self, subject: &str) -> Result<String> {
        self.issue(subject, TokenKind::Access).map(|issued| issued.token)
    }

    pub fn issue_refresh_token(&self, subject: &str) -> Result<String> {
        self.issue(subject, TokenKind::Refresh).map(|issued| issued.token)
    }

    /// Issues a token of `kind` and returns it with its claims
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<IssuedToken> {
        self.issue_at(subject, kind, now())
    }

    /// Issues a token of `kind` as if the current time were `now` (epoch seconds)
    pub fn issue_at(&self, subject: &str, kind: TokenKind, now: i64) -> Result<IssuedToken> {
        let ttl = i64::try_from(self.ttl(kind).as_secs()).map_err(|_| {
            AuthorityError::ConfigError(format!("{} token lifetime is out of range", kind))
        })?;
        let claims = ClaimSet::new(subject.to_string(), kind, now, ttl)?;
        let token = self.seal(&claims)?;

        log::debug!(
            "Issued {} token {} for subject {} (expires at {})",
            kind,
            claims.token_id,
            claims.subject,
            claims.expires_at
        );
        Ok(IssuedToken { token, claims })
    }

    /// Encodes and signs an arbitrary claim set into the wire representation
    pub fn seal(&self, claims: &ClaimSet) -> Result<String> {
        let encoded = ClaimsCodec::encode(claims)?;
        let signature = self.signer.sign(&encoded);

        Ok(format!(
            "{}{}{}",
            URL_SAFE_NO_PAD.encode(&encoded),
            TOKEN_SEGMENT_SEPARATOR,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Validates a token against the current time
    pub fn validate(&self, token: &str, expected: TokenKind) -> std::result::Result<ClaimSet, TokenError> {
        self.validate_at(token, expected, now())
    }

    /// Validates a token as if the current time were `now` (epoch seconds).
    ///
    /// Order matters: structure, then signature, then claims, then expiry, then kind.
    /// Nothing inside the payload is trusted before the signature check passes.
    pub fn validate_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: i64,
    ) -> std::result::Result<ClaimSet, TokenError> {
        let (encoded, signature) = split_token(token)?;

        if !self.signer.verify(&encoded, &signature) {
            return Err(TokenError::BadSignature);
        }

        let claims = ClaimsCodec::decode(&encoded)?;

        let skew = i64::try_from(self.clock_skew.as_secs()).unwrap_or(i64::MAX);
        if claims.is_expired_at(now, skew) {
            return Err(TokenError::Expired);
        }

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }

    /// Validates a token and returns only its subject
    pub fn extract_subject(&self, token: &str, expected: TokenKind) -> std::result::Result<String, TokenError> {
        self.validate(token, expected).map(|claims| claims.subject)
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Splits `claims.signature` and decodes both halves
fn split_token(token: &str) -> std::result::Result<(Vec<u8>, Vec<u8>), TokenError> {
    if token.len() > MAX_TOKEN_LENGTH {
        return Err(TokenError::Malformed("token too long".to_string()));
    }

    let (claims_part, signature_part) = token
        .split_once(TOKEN_SEGMENT_SEPARATOR)
        .ok_or_else(|| TokenError::Malformed("missing separator".to_string()))?;

    if claims_part.is_empty() || signature_part.is_empty() || signature_part.contains(TOKEN_SEGMENT_SEPARATOR) {
        return Err(TokenError::Malformed("expected exactly two segments".to_string()));
    }

    let encoded = URL_SAFE_NO_PAD
        .decode(claims_part)
        .map_err(|_| TokenError::Malformed("invalid claims encoding".to_string()))?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature_part)
        .map_err(|_| TokenError::Malformed("invalid signature encoding".to_string()))?;

    Ok((encoded, signature))
}

/// Extracts bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TokenProvider {
        TokenProvider::new(&AuthorityConfig::new("unit-test-signing-key_9f8e7d6c5b4a3f2e1d0c")).unwrap()
    }

    #[test]
    fn test_split_token_shapes() {
        assert!(split_token("abc").is_err());
        assert!(split_token(".abc").is_err());
        assert!(split_token("abc.").is_err());
        assert!(split_token("a.b.c").is_err());
        assert!(split_token("!!!.abc").is_err());
        assert!(split_token("YWJj.ZGVm").is_ok());
    }

    #[test]
    fn test_oversized_token_is_malformed() {
        let huge = "a".repeat(MAX_TOKEN_LENGTH + 1);
        assert!(matches!(
            provider().validate(&huge, TokenKind::Access),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_issued_lifetimes_follow_kind() {
        let provider = provider();
        let issued = 1_000;
        let access = provider.issue_at("alice", TokenKind::Access, issued).unwrap().token;
        let refresh = provider.issue_at("alice", TokenKind::Refresh, issued).unwrap().token;

        let access = provider.validate_at(&access, TokenKind::Access, issued).unwrap();
        let refresh = provider.validate_at(&refresh, TokenKind::Refresh, issued).unwrap();
        assert_eq!(access.lifetime_secs(), 900);
        assert_eq!(refresh.lifetime_secs(), 7 * 24 * 3600);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("bearer abc"), None);
    }
}
