use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{FollowsRepo, RepoError};

use super::PostgresRepositories;
use super::util::map_sqlx_error;

#[async_trait]
impl FollowsRepo for PostgresRepositories {
    async fn insert_edge(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        // The unique index resolves concurrent duplicates; DO NOTHING keeps
        // the repeat attempt silent.
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followee_id) \
             VALUES ($1, $2) \
             ON CONFLICT (follower_id, followee_id) DO NOTHING",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_edge(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower_id)
            .bind(followee_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn edge_exists(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(exists)
    }

    async fn followees_of(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT followee_id FROM follows WHERE follower_id = $1")
                .bind(follower_id)
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(ids)
    }
}
