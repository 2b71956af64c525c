//! Tests for loading configuration from the process environment

use session_authority::config::{AuthorityConfig, LoginErrorPolicy};
use session_authority::error::AuthorityError;
use std::env;
use std::time::Duration;

const VARS: [&str; 5] = [
    "SESSION_AUTHORITY_SIGNING_KEY",
    "SIGNING_KEY",
    "SESSION_AUTHORITY_ACCESS_TTL_SECS",
    "SESSION_AUTHORITY_REFRESH_TTL_SECS",
    "SESSION_AUTHORITY_LOGIN_ERRORS",
];

// Environment is process-global, so every case runs inside this one test
#[test]
fn test_from_env() {
    let saved: Vec<(&str, Option<String>)> = VARS.iter().map(|v| (*v, env::var(v).ok())).collect();
    for var in VARS {
        env::remove_var(var);
    }

    // Missing key is reported with a helpful message
    let error = AuthorityConfig::from_env().unwrap_err();
    assert!(matches!(error, AuthorityError::ConfigError(_)));
    assert!(error.to_string().contains("SIGNING_KEY"));

    // Unprefixed fallback works
    env::set_var("SIGNING_KEY", "env-loaded-signing-key_m9n8b7v6c5x4z3l2k1j0");
    let config = AuthorityConfig::from_env().unwrap();
    assert_eq!(config.access_token_ttl, Duration::from_secs(900));
    assert_eq!(config.login_error_policy, LoginErrorPolicy::Uniform);

    // Overrides
    env::set_var("SESSION_AUTHORITY_ACCESS_TTL_SECS", "300");
    env::set_var("SESSION_AUTHORITY_REFRESH_TTL_SECS", "86400");
    env::set_var("SESSION_AUTHORITY_LOGIN_ERRORS", "detailed");
    let config = AuthorityConfig::from_env().unwrap();
    assert_eq!(config.access_token_ttl, Duration::from_secs(300));
    assert_eq!(config.refresh_token_ttl, Duration::from_secs(86400));
    assert_eq!(config.login_error_policy, LoginErrorPolicy::Detailed);

    // Insecure key rejected
    env::set_var("SESSION_AUTHORITY_SIGNING_KEY", "change-this-before-deploying-to-production");
    assert!(AuthorityConfig::from_env().is_err());

    // Unknown policy rejected
    env::remove_var("SESSION_AUTHORITY_SIGNING_KEY");
    env::set_var("SESSION_AUTHORITY_LOGIN_ERRORS", "verbose");
    assert!(AuthorityConfig::from_env().is_err());

    for (var, value) in saved {
        match value {
            Some(value) => env::set_var(var, value),
            None => env::remove_var(var),
        }
    }
}
