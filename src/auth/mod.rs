//! Authentication and token lifecycle module

pub mod claims;
pub mod credentials;
pub mod flow;
pub mod signer;
pub mod token;
pub mod user;

// Re-export main components
pub use claims::{ClaimSet, ClaimsCodec, TokenKind};
pub use credentials::{Argon2Verifier, CredentialVerifier};
pub use flow::{AuthFlow, TokenPair};
pub use signer::Signer;
pub use token::{extract_bearer_token, IssuedToken, TokenProvider};
pub use user::Identity;
