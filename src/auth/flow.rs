//! Registration, login and refresh orchestration
//!
//! Sits on top of [`TokenProvider`] and the two external capabilities
//! ([`UserStore`], [`CredentialVerifier`]). This is the layer that decides which
//! internal failure distinctions are visible to callers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::claims::{ClaimSet, TokenKind};
use crate::auth::credentials::CredentialVerifier;
use crate::auth::token::{extract_bearer_token, TokenProvider};
use crate::auth::user::{validate_username, Identity};
use crate::config::{AuthorityConfig, LoginErrorPolicy};
use crate::constants::TOKEN_TYPE_BEARER;
use crate::error::{AuthorityError, Result, SessionFailure, TokenError};
use crate::security::AuthTimer;
use crate::security_logger::{LoginFailureReason, SecurityEvent, SecurityLogger};
use crate::storage::UserStore;

/// Tokens handed out on successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

pub struct AuthFlow {
    tokens: Arc<TokenProvider>,
    users: Arc<dyn UserStore>,
    credentials: Arc<dyn CredentialVerifier>,
    security_logger: Arc<SecurityLogger>,
    min_password_length: usize,
    login_error_policy: LoginErrorPolicy,
    verify_user_on_refresh: bool,
    min_auth_duration: Duration,
}

impl AuthFlow {
    /// Builds the flow and its token provider. Fails fast on bad configuration.
    pub fn new(
        config: &AuthorityConfig,
        users: Arc<dyn UserStore>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenProvider::new(config)?);
        Ok(Self::assemble(config, tokens, users, credentials, Arc::new(SecurityLogger::new())))
    }

    /// Like [`AuthFlow::new`], but records events on a shared logger.
    /// A rejected configuration is recorded there before the error is returned.
    pub async fn with_logger(
        config: &AuthorityConfig,
        users: Arc<dyn UserStore>,
        credentials: Arc<dyn CredentialVerifier>,
        logger: Arc<SecurityLogger>,
    ) -> Result<Self> {
        let tokens = match TokenProvider::new(config) {
            Ok(tokens) => Arc::new(tokens),
            Err(e) => {
                logger
                    .log_event(SecurityEvent::ConfigurationError {
                        component: "auth_flow".to_string(),
                        error: e.to_string(),
                    })
                    .await;
                return Err(e);
            }
        };
        Ok(Self::assemble(config, tokens, users, credentials, logger))
    }

    fn assemble(
        config: &AuthorityConfig,
        tokens: Arc<TokenProvider>,
        users: Arc<dyn UserStore>,
        credentials: Arc<dyn CredentialVerifier>,
        security_logger: Arc<SecurityLogger>,
    ) -> Self {
        Self {
            tokens,
            users,
            credentials,
            security_logger,
            min_password_length: config.min_password_length,
            login_error_policy: config.login_error_policy,
            verify_user_on_refresh: config.verify_user_on_refresh,
            min_auth_duration: config.min_auth_duration,
        }
    }

    pub fn token_provider(&self) -> &Arc<TokenProvider> {
        &self.tokens
    }

    pub fn security_logger(&self) -> &Arc<SecurityLogger> {
        &self.security_logger
    }

    /// Register a new identity
    pub async fn register(&self, username: &str, plain_password: &str) -> Result<Identity> {
        if let Err(e) = validate_username(username)
            .and_then(|_| self.check_password_strength(username, plain_password))
        {
            self.reject_registration(username, &e).await;
            return Err(e);
        }

        let password_hash = self.credentials.hash(plain_password).await?;
        let identity = Identity::new(username.to_string(), password_hash);

        if !self.users.insert_if_absent(identity.clone()).await? {
            let e = AuthorityError::DuplicateUsername(username.to_string());
            self.reject_registration(username, &e).await;
            return Err(e);
        }

        self.security_logger
            .log_event(SecurityEvent::RegistrationSucceeded {
                username: identity.username.clone(),
                user_id: identity.id,
            })
            .await;
        Ok(identity)
    }

    /// Verify credentials and issue an access/refresh token pair
    pub async fn login(&self, username: &str, plain_password: &str) -> Result<TokenPair> {
        let timer = AuthTimer::new(self.min_auth_duration);

        let result = match self.check_credentials(username, plain_password).await {
            Ok(identity) => self.issue_pair(&identity.username).await,
            Err(e) => Err(e),
        };

        timer.wait().await;
        result
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String> {
        let claims = match self.tokens.validate(refresh_token, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(e) => return Err(self.reject_refresh(SessionFailure::Token(e)).await),
        };

        if self.verify_user_on_refresh
            && self.users.find_by_username(&claims.subject).await?.is_none()
        {
            return Err(self
                .reject_refresh(SessionFailure::SubjectUnknown(claims.subject))
                .await);
        }

        let issued = self.tokens.issue(&claims.subject, TokenKind::Access)?;

        self.security_logger
            .log_event(SecurityEvent::RefreshSucceeded {
                subject: claims.subject.clone(),
                token_id: claims.token_id,
            })
            .await;
        self.log_issued(&issued.claims).await;

        Ok(issued.token)
    }

    /// Authenticate a resource request from its `Authorization` header.
    /// Only access tokens are accepted here.
    pub async fn authenticate(&self, authorization_header: &str) -> Result<ClaimSet> {
        let result = match extract_bearer_token(authorization_header) {
            Some(token) => self.tokens.validate(token, TokenKind::Access),
            None => Err(TokenError::Malformed("missing bearer token".to_string())),
        };

        match result {
            Ok(claims) => Ok(claims),
            Err(e) => {
                self.security_logger
                    .log_event(SecurityEvent::TokenRejected {
                        expected: TokenKind::Access,
                        reason: e.to_string(),
                    })
                    .await;
                Err(AuthorityError::Token(e))
            }
        }
    }

    async fn check_credentials(&self, username: &str, plain_password: &str) -> Result<Identity> {
        let identity = match self.users.find_by_username(username).await? {
            Some(identity) => identity,
            None => {
                return Err(self
                    .reject_login(username, LoginFailureReason::UnknownUser)
                    .await)
            }
        };

        if !self
            .credentials
            .matches(plain_password, &identity.password_hash)
            .await?
        {
            return Err(self
                .reject_login(username, LoginFailureReason::BadCredential)
                .await);
        }

        self.security_logger
            .log_event(SecurityEvent::LoginSucceeded {
                username: identity.username.clone(),
            })
            .await;
        Ok(identity)
    }

    async fn issue_pair(&self, subject: &str) -> Result<TokenPair> {
        let access = self.tokens.issue(subject, TokenKind::Access)?;
        let refresh = self.tokens.issue(subject, TokenKind::Refresh)?;

        self.log_issued(&access.claims).await;
        self.log_issued(&refresh.claims).await;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.tokens.ttl(TokenKind::Access).as_secs(),
        })
    }

    fn check_password_strength(&self, username: &str, plain_password: &str) -> Result<()> {
        if plain_password.trim().is_empty() {
            return Err(AuthorityError::WeakCredential(
                "Password must not be blank".to_string(),
            ));
        }

        if plain_password.chars().count() < self.min_password_length {
            return Err(AuthorityError::WeakCredential(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }

        if plain_password == username {
            return Err(AuthorityError::WeakCredential(
                "Password must differ from the username".to_string(),
            ));
        }

        Ok(())
    }

    async fn log_issued(&self, claims: &ClaimSet) {
        self.security_logger
            .log_event(SecurityEvent::TokenIssued {
                subject: claims.subject.clone(),
                kind: claims.kind,
                token_id: claims.token_id,
            })
            .await;
    }

    async fn reject_registration(&self, username: &str, error: &AuthorityError) {
        self.security_logger
            .log_event(SecurityEvent::RegistrationRejected {
                username: username.to_string(),
                reason: error.to_string(),
            })
            .await;
    }

    /// Logs the precise reason, returns what the caller is allowed to see
    async fn reject_login(&self, username: &str, reason: LoginFailureReason) -> AuthorityError {
        self.security_logger
            .log_event(SecurityEvent::LoginFailed {
                username: username.to_string(),
                reason,
            })
            .await;

        match (self.login_error_policy, reason) {
            (LoginErrorPolicy::Uniform, _) => AuthorityError::InvalidCredentials,
            (LoginErrorPolicy::Detailed, LoginFailureReason::UnknownUser) => {
                AuthorityError::UnknownUser(username.to_string())
            }
            (LoginErrorPolicy::Detailed, LoginFailureReason::BadCredential) => {
                AuthorityError::BadCredential
            }
        }
    }

    async fn reject_refresh(&self, failure: SessionFailure) -> AuthorityError {
        self.security_logger
            .log_event(SecurityEvent::RefreshRejected {
                reason: failure.to_string(),
            })
            .await;
        AuthorityError::InvalidSession(failure)
    }
}
