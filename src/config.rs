//! Authority configuration module
//! Handles token lifetimes, the signing key and credential policy

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MIN_AUTH_DURATION_MS,
    DEFAULT_MIN_PASSWORD_LENGTH, DEFAULT_REFRESH_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS,
    MIN_SIGNING_KEY_LENGTH,
};
use crate::error::{AuthorityError, Result};
use std::env;
use std::fmt;
use std::time::Duration;

/// How login failures are reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginErrorPolicy {
    /// Unknown user and wrong password both surface as `InvalidCredentials`
    Uniform,
    /// Unknown user and wrong password surface as distinct errors
    Detailed,
}

impl LoginErrorPolicy {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "detailed" => Ok(Self::Detailed),
            other => Err(AuthorityError::ConfigError(format!(
                "Unknown login error policy '{}', expected 'uniform' or 'detailed'",
                other
            ))),
        }
    }
}

/// Authority configuration parameters
#[derive(Clone)]
pub struct AuthorityConfig {
    /// HMAC key for token signing/validation
    pub signing_key: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Grace period applied to expiry checks
    pub clock_skew_tolerance: Duration,
    pub min_password_length: usize,
    pub login_error_policy: LoginErrorPolicy,
    /// Reject refresh for subjects that are no longer in the user store
    pub verify_user_on_refresh: bool,
    /// Minimum wall time of a login attempt
    pub min_auth_duration: Duration,
}

// Never print the key
impl fmt::Debug for AuthorityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorityConfig")
            .field("signing_key", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("clock_skew_tolerance", &self.clock_skew_tolerance)
            .field("min_password_length", &self.min_password_length)
            .field("login_error_policy", &self.login_error_policy)
            .field("verify_user_on_refresh", &self.verify_user_on_refresh)
            .field("min_auth_duration", &self.min_auth_duration)
            .finish()
    }
}

impl AuthorityConfig {
    /// Build a configuration with default lifetimes around the given key.
    /// The key is checked by [`AuthorityConfig::validate`], not here.
    pub fn new(signing_key: impl Into<String>) -> Self {
        Self {
            signing_key: signing_key.into(),
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::from_secs(DEFAULT_REFRESH_TOKEN_TTL_SECS),
            clock_skew_tolerance: Duration::from_secs(DEFAULT_CLOCK_SKEW_SECS),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            login_error_policy: LoginErrorPolicy::Uniform,
            verify_user_on_refresh: true,
            min_auth_duration: Duration::from_millis(DEFAULT_MIN_AUTH_DURATION_MS),
        }
    }

    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    pub fn with_clock_skew_tolerance(mut self, skew: Duration) -> Self {
        self.clock_skew_tolerance = skew;
        self
    }

    pub fn with_login_error_policy(mut self, policy: LoginErrorPolicy) -> Self {
        self.login_error_policy = policy;
        self
    }

    pub fn with_verify_user_on_refresh(mut self, enabled: bool) -> Self {
        self.verify_user_on_refresh = enabled;
        self
    }

    pub fn with_min_auth_duration(mut self, duration: Duration) -> Self {
        self.min_auth_duration = duration;
        self
    }

    /// Validate that the signing key meets security requirements
    fn validate_signing_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(AuthorityError::ConfigError(
                "Signing key is required. Generate one with: authctl generate-key".to_string(),
            ));
        }

        if key.len() < MIN_SIGNING_KEY_LENGTH {
            return Err(AuthorityError::ConfigError(format!(
                "Signing key must be at least {} characters long",
                MIN_SIGNING_KEY_LENGTH
            )));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "your-secret-key",
            "change-this",
            "changeme",
            "INSECURE-DEFAULT",
            "default",
            "password",
            "12345",
        ];

        for pattern in &insecure_patterns {
            if key.contains(pattern) {
                return Err(AuthorityError::ConfigError(format!(
                    "Signing key contains insecure pattern '{}'. Please use a secure random key generated with: authctl generate-key",
                    pattern
                )));
            }
        }

        if key.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AuthorityError::ConfigError(
                "Signing key should contain mixed characters (letters, numbers, symbols)".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate lifetimes and the signing key. Called by the token provider at construction.
    pub fn validate(&self) -> Result<()> {
        Self::validate_signing_key(&self.signing_key)?;

        if self.access_token_ttl.is_zero() {
            return Err(AuthorityError::ConfigError(
                "Access token TTL must be greater than zero".to_string(),
            ));
        }

        let bounded = [
            ("Access token TTL", self.access_token_ttl),
            ("Refresh token TTL", self.refresh_token_ttl),
            ("Clock skew tolerance", self.clock_skew_tolerance),
        ];
        for (name, value) in bounded {
            if value.as_secs() > MAX_TOKEN_TTL_SECS {
                return Err(AuthorityError::ConfigError(format!(
                    "{} ({}s) exceeds the maximum of {}s",
                    name,
                    value.as_secs(),
                    MAX_TOKEN_TTL_SECS
                )));
            }
        }

        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(AuthorityError::ConfigError(format!(
                "Refresh token TTL ({}s) must be longer than access token TTL ({}s)",
                self.refresh_token_ttl.as_secs(),
                self.access_token_ttl.as_secs()
            )));
        }

        if self.min_password_length == 0 {
            return Err(AuthorityError::ConfigError(
                "Minimum password length must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_source(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signing_key = lookup("SESSION_AUTHORITY_SIGNING_KEY")
            .or_else(|| lookup("SIGNING_KEY"))
            .ok_or_else(|| {
                AuthorityError::ConfigError(
                    "SIGNING_KEY environment variable is required. \
                     Generate one with: authctl generate-key"
                        .to_string(),
                )
            })?;

        let number = |name: &str, default: u64| -> Result<u64> {
            match lookup(name) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    AuthorityError::ConfigError(format!("{} must be a whole number, got '{}'", name, raw))
                }),
                None => Ok(default),
            }
        };

        let flag = |name: &str, default: bool| -> Result<bool> {
            match lookup(name) {
                Some(raw) => match raw.trim().to_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => Ok(true),
                    "false" | "0" | "no" | "off" => Ok(false),
                    _ => Err(AuthorityError::ConfigError(format!(
                        "{} must be true or false, got '{}'",
                        name, raw
                    ))),
                },
                None => Ok(default),
            }
        };

        let access_token_ttl = Duration::from_secs(number(
            "SESSION_AUTHORITY_ACCESS_TTL_SECS",
            DEFAULT_ACCESS_TOKEN_TTL_SECS,
        )?);
        let refresh_token_ttl = Duration::from_secs(number(
            "SESSION_AUTHORITY_REFRESH_TTL_SECS",
            DEFAULT_REFRESH_TOKEN_TTL_SECS,
        )?);
        let clock_skew_tolerance = Duration::from_secs(number(
            "SESSION_AUTHORITY_CLOCK_SKEW_SECS",
            DEFAULT_CLOCK_SKEW_SECS,
        )?);

        let min_password_length = usize::try_from(number(
            "SESSION_AUTHORITY_MIN_PASSWORD_LEN",
            DEFAULT_MIN_PASSWORD_LENGTH as u64,
        )?)
        .map_err(|_| {
            AuthorityError::ConfigError("SESSION_AUTHORITY_MIN_PASSWORD_LEN is out of range".to_string())
        })?;

        let login_error_policy = match lookup("SESSION_AUTHORITY_LOGIN_ERRORS") {
            Some(raw) => LoginErrorPolicy::parse(&raw)?,
            None => LoginErrorPolicy::Uniform,
        };

        let verify_user_on_refresh = flag("SESSION_AUTHORITY_VERIFY_USER_ON_REFRESH", true)?;

        let min_auth_ms = number("SESSION_AUTHORITY_MIN_AUTH_MS", DEFAULT_MIN_AUTH_DURATION_MS)?;

        let config = Self {
            signing_key,
            access_token_ttl,
            refresh_token_ttl,
            clock_skew_tolerance,
            min_password_length,
            login_error_policy,
            verify_user_on_refresh,
            min_auth_duration: Duration::from_millis(min_auth_ms),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY: &str = "k3y-material_for_config_tests_9f8e7d6c5b";

    fn source(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_source_requires_key() {
        let result = AuthorityConfig::from_source(source(&[]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SIGNING_KEY"));
    }

    #[test]
    fn test_defaults_applied() {
        let config = AuthorityConfig::from_source(source(&[("SIGNING_KEY", KEY)])).unwrap();
        assert_eq!(config.access_token_ttl, Duration::from_secs(900));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(604_800));
        assert_eq!(config.clock_skew_tolerance, Duration::ZERO);
        assert_eq!(config.login_error_policy, LoginErrorPolicy::Uniform);
        assert!(config.verify_user_on_refresh);
    }

    #[test]
    fn test_prefixed_key_wins() {
        let config = AuthorityConfig::from_source(source(&[
            ("SIGNING_KEY", "fallback-key_that_is_long_enough_000000"),
            ("SESSION_AUTHORITY_SIGNING_KEY", KEY),
        ]))
        .unwrap();
        assert_eq!(config.signing_key, KEY);
    }

    #[test]
    fn test_overrides_parsed() {
        let config = AuthorityConfig::from_source(source(&[
            ("SIGNING_KEY", KEY),
            ("SESSION_AUTHORITY_ACCESS_TTL_SECS", "60"),
            ("SESSION_AUTHORITY_REFRESH_TTL_SECS", "3600"),
            ("SESSION_AUTHORITY_CLOCK_SKEW_SECS", "5"),
            ("SESSION_AUTHORITY_LOGIN_ERRORS", "Detailed"),
            ("SESSION_AUTHORITY_VERIFY_USER_ON_REFRESH", "false"),
            ("SESSION_AUTHORITY_MIN_AUTH_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.access_token_ttl, Duration::from_secs(60));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.clock_skew_tolerance, Duration::from_secs(5));
        assert_eq!(config.login_error_policy, LoginErrorPolicy::Detailed);
        assert!(!config.verify_user_on_refresh);
        assert_eq!(config.min_auth_duration, Duration::ZERO);
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let result = AuthorityConfig::from_source(source(&[
            ("SIGNING_KEY", KEY),
            ("SESSION_AUTHORITY_ACCESS_TTL_SECS", "600"),
            ("SESSION_AUTHORITY_REFRESH_TTL_SECS", "600"),
        ]));
        assert!(result.unwrap_err().to_string().contains("must be longer"));
    }

    #[test]
    fn test_bad_number_rejected() {
        let result = AuthorityConfig::from_source(source(&[
            ("SIGNING_KEY", KEY),
            ("SESSION_AUTHORITY_ACCESS_TTL_SECS", "fifteen"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unparseable_values_rejected() {
        for (name, value) in [
            ("SESSION_AUTHORITY_MIN_PASSWORD_LEN", "eight"),
            ("SESSION_AUTHORITY_MIN_AUTH_MS", "-5"),
            ("SESSION_AUTHORITY_VERIFY_USER_ON_REFRESH", "maybe"),
            ("SESSION_AUTHORITY_VERIFY_USER_ON_REFRESH", "ture"),
        ] {
            let result = AuthorityConfig::from_source(source(&[("SIGNING_KEY", KEY), (name, value)]));
            let error = result.unwrap_err();
            assert!(matches!(error, AuthorityError::ConfigError(_)));
            assert!(error.to_string().contains(name), "{}={} not reported", name, value);
        }
    }

    #[test]
    fn test_flag_spellings() {
        for (value, expected) in [("yes", true), ("ON", true), ("1", true), ("no", false), ("0", false)] {
            let config = AuthorityConfig::from_source(source(&[
                ("SIGNING_KEY", KEY),
                ("SESSION_AUTHORITY_VERIFY_USER_ON_REFRESH", value),
            ]))
            .unwrap();
            assert_eq!(config.verify_user_on_refresh, expected, "{}", value);
        }
    }

    #[test]
    fn test_oversized_lifetimes_rejected() {
        let huge = Duration::from_secs(1 << 62);
        for config in [
            AuthorityConfig::new(KEY).with_refresh_token_ttl(huge),
            AuthorityConfig::new(KEY)
                .with_access_token_ttl(huge)
                .with_refresh_token_ttl(huge + Duration::from_secs(1)),
            AuthorityConfig::new(KEY).with_clock_skew_tolerance(huge),
        ] {
            let error = config.validate().unwrap_err();
            assert!(error.to_string().contains("exceeds the maximum"), "{}", error);
        }

        let at_limit = AuthorityConfig::new(KEY).with_refresh_token_ttl(Duration::from_secs(MAX_TOKEN_TTL_SECS));
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_insecure_keys_rejected() {
        for key in [
            "short",
            "your-secret-key-padded-out-to-32-characters",
            "onlyalphabeticcharactersinthiskeyxyz",
            "password_password_password_password_1",
        ] {
            assert!(AuthorityConfig::new(key).validate().is_err(), "accepted {}", key);
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AuthorityConfig::new(KEY);
        assert!(!format!("{:?}", config).contains(KEY));
    }
}
