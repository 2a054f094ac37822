use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    NewPostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;

use super::util::map_sqlx_error;
use super::{POSTS_ORDER_CLAUSE, PostgresRepositories};

const POST_COLUMNS: &str = "id, seq, author_id, group_id, text, image_ref, created_at";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    seq: i64,
    author_id: Uuid,
    group_id: Option<Uuid>,
    text: String,
    image_ref: Option<String>,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            seq: row.seq,
            author_id: row.author_id,
            group_id: row.group_id,
            text: row.text,
            image_ref: row.image_ref,
            created_at: row.created_at,
        }
    }
}

fn collect(rows: Vec<PostRow>) -> Vec<PostRecord> {
    rows.into_iter().map(PostRecord::from).collect()
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts{POSTS_ORDER_CLAUSE}");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(collect(rows))
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let sql =
            format!("SELECT {POST_COLUMNS} FROM posts WHERE group_id = $1{POSTS_ORDER_CLAUSE}");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(group_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(collect(rows))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let sql =
            format!("SELECT {POST_COLUMNS} FROM posts WHERE author_id = $1{POSTS_ORDER_CLAUSE}");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(author_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(collect(rows))
    }

    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ANY($1){POSTS_ORDER_CLAUSE}"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(author_ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(collect(rows))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        count
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: NewPostParams) -> Result<PostRecord, RepoError> {
        let NewPostParams {
            author_id,
            group_id,
            text,
            image_ref,
        } = params;

        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        let sql = format!(
            "INSERT INTO posts (id, author_id, group_id, text, image_ref, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(author_id)
            .bind(group_id)
            .bind(text)
            .bind(image_ref)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let UpdatePostParams {
            id,
            group_id,
            text,
            image_ref,
        } = params;

        let sql = format!(
            "UPDATE posts \
             SET group_id = $2, text = $3, image_ref = $4 \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(group_id)
            .bind(text)
            .bind(image_ref)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
