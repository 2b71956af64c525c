use std::error::Error;
use std::fmt;

use crate::auth::claims::TokenKind;

/// Reasons a presented token was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Malformed(String),
    BadSignature,
    Expired,
    WrongKind { expected: TokenKind, actual: TokenKind },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "Malformed token: {}", reason),
            Self::BadSignature => write!(f, "Token signature mismatch"),
            Self::Expired => write!(f, "Token expired"),
            Self::WrongKind { expected, actual } => {
                write!(f, "Wrong token kind: expected {}, got {}", expected, actual)
            }
        }
    }
}

impl Error for TokenError {}

/// Internal cause behind a rejected refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    Token(TokenError),
    SubjectUnknown(String),
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(err) => write!(f, "{}", err),
            Self::SubjectUnknown(subject) => write!(f, "Subject no longer exists: {}", subject),
        }
    }
}

#[derive(Debug)]
pub enum AuthorityError {
    // Configuration errors
    ConfigError(String),

    // Token errors
    Token(TokenError),

    // Registration errors
    DuplicateUsername(String),
    WeakCredential(String),

    // Login errors (internal distinctions)
    UnknownUser(String),
    BadCredential,

    // Externally surfaced categories
    InvalidCredentials,
    InvalidSession(SessionFailure),

    // Validation errors
    ValidationError(String),

    // Storage errors
    StorageError(String),

    // System errors
    SystemError(String),
}

impl fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::Token(err) => write!(f, "{}", err),
            Self::DuplicateUsername(name) => write!(f, "Username already taken: {}", name),
            Self::WeakCredential(msg) => write!(f, "Weak credential: {}", msg),
            Self::UnknownUser(name) => write!(f, "Unknown user: {}", name),
            Self::BadCredential => write!(f, "Password does not match"),
            Self::InvalidCredentials => write!(f, "Invalid credentials: username or password is incorrect"),
            // The cause stays internal; callers only learn they must log in again
            Self::InvalidSession(_) => write!(f, "Invalid or expired session, please re-authenticate"),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
        }
    }
}

impl Error for AuthorityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Token(err) => Some(err),
            Self::InvalidSession(SessionFailure::Token(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<TokenError> for AuthorityError {
    fn from(err: TokenError) -> Self {
        AuthorityError::Token(err)
    }
}

impl From<tokio::task::JoinError> for AuthorityError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthorityError::SystemError(format!("Background task failed: {}", err))
    }
}

// Generic result type for the authority
pub type Result<T> = std::result::Result<T, AuthorityError>;
