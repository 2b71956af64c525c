//! In-memory storage implementation for development and testing
//!
//! Keeps all identities in a map guarded by a single lock. Suitable for
//! development, testing, or single-node deployments without persistence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::UserStore;
use crate::auth::user::Identity;
use crate::error::Result;

/// In-memory user storage
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, Identity>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Remove a user. Returns the removed identity if it existed.
    pub async fn remove(&self, username: &str) -> Option<Identity> {
        let removed = self.users.write().await.remove(username);
        if removed.is_some() {
            log::info!("Removed user {}", username);
        }
        removed
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert_if_absent(&self, identity: Identity) -> Result<bool> {
        // Check and insert under one write guard
        let mut users = self.users.write().await;
        if users.contains_key(&identity.username) {
            return Ok(false);
        }
        log::debug!("Stored user {} ({})", identity.username, identity.id);
        users.insert(identity.username.clone(), identity);
        Ok(true)
    }
}
