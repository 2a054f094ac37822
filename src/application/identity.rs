//! Identity resolution.
//!
//! Authentication itself is an upstream concern; requests arrive carrying
//! an already-authenticated principal. Resolution maps that principal to a
//! stored user, or to nobody.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, principal: &str) -> Result<Option<UserRecord>, RepoError>;
}

/// Resolves principals as usernames against the user store.
#[derive(Clone)]
pub struct StoreIdentity {
    users: Arc<dyn UsersRepo>,
}

impl StoreIdentity {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl IdentityResolver for StoreIdentity {
    async fn resolve(&self, principal: &str) -> Result<Option<UserRecord>, RepoError> {
        let trimmed = principal.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        self.users.find_by_username(trimmed).await
    }
}
