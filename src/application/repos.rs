//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewPostParams {
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_ref: Option<String>,
}

/// Author and creation timestamp are immutable; an update touches only the
/// editable fields.
#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCommentParams {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
pub trait GroupsRepo: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupRecord>, RepoError>;
}

/// Read-side post queries. Every listing returns posts newest-first with
/// insertion-order tie-breaks; callers paginate the result.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError>;

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostRecord>, RepoError>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepoError>;

    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: NewPostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn insert_comment(&self, params: NewCommentParams) -> Result<CommentRecord, RepoError>;

    /// Comments for one post, creation-ascending.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

/// Directed follow edges. Uniqueness lives in the store (unique index with
/// conflict-ignoring inserts), never as an application-level check-then-act.
#[async_trait]
pub trait FollowsRepo: Send + Sync {
    /// Insert an edge; returns `false` when the edge already existed.
    async fn insert_edge(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError>;

    async fn delete_edge(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), RepoError>;

    async fn edge_exists(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError>;

    async fn followees_of(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
}

/// Store liveness probe for the health endpoint.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
