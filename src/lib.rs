//! Session Authority - credential and session token service
//!
//! This library registers identities, verifies login credentials, and
//! issues, validates and refreshes signed access and refresh tokens.

pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod security;
pub mod security_logger;
pub mod storage;

// Re-export main components
pub use auth::{AuthFlow, ClaimSet, TokenKind, TokenPair, TokenProvider};
pub use config::{AuthorityConfig, LoginErrorPolicy};
pub use error::{AuthorityError, Result, SessionFailure, TokenError};
