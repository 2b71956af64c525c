//! Abstract storage interfaces for pluggable backends

use async_trait::async_trait;

use crate::auth::user::Identity;
use crate::error::Result;

/// User persistence interface
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    /// Insert the identity unless its username is already taken.
    ///
    /// The absence check and the insert must be one atomic step: two
    /// concurrent calls with the same username yield exactly one `true`.
    async fn insert_if_absent(&self, identity: Identity) -> Result<bool>;
}
