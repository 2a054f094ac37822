//! Follow-graph maintenance.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::repos::{FollowsRepo, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("unknown user")]
    UnknownUser,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UsersRepo>,
    follows: Arc<dyn FollowsRepo>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UsersRepo>, follows: Arc<dyn FollowsRepo>) -> Self {
        Self { users, follows }
    }

    /// Create a follow edge toward `followee_username`.
    ///
    /// Silent no-op when the edge already exists or the target is the
    /// follower; concurrent duplicate attempts collapse on the store's
    /// unique constraint rather than an application-level check.
    pub async fn follow(
        &self,
        follower: &UserRecord,
        followee_username: &str,
    ) -> Result<(), FollowError> {
        let followee = self.resolve(followee_username).await?;

        if follower.id == followee.id {
            debug!(username = %follower.username, "ignoring self-follow");
            return Ok(());
        }

        match self.follows.insert_edge(follower.id, followee.id).await {
            Ok(created) => {
                if created {
                    debug!(
                        follower = %follower.username,
                        followee = %followee.username,
                        "follow edge created"
                    );
                }
                Ok(())
            }
            // A concurrent writer can still surface the constraint.
            Err(RepoError::Duplicate { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove the follow edge toward `followee_username`; no-op if absent.
    pub async fn unfollow(
        &self,
        follower: &UserRecord,
        followee_username: &str,
    ) -> Result<(), FollowError> {
        let followee = self.resolve(followee_username).await?;
        self.follows.delete_edge(follower.id, followee.id).await?;
        Ok(())
    }

    pub async fn is_following(
        &self,
        follower: &UserRecord,
        followee: &UserRecord,
    ) -> Result<bool, FollowError> {
        Ok(self.follows.edge_exists(follower.id, followee.id).await?)
    }

    async fn resolve(&self, username: &str) -> Result<UserRecord, FollowError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or(FollowError::UnknownUser)
    }
}
