//! Append-only comments on posts.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::forms::{CommentInput, FieldErrors};
use crate::application::repos::{CommentsRepo, NewCommentParams, PostsRepo, RepoError};
use crate::domain::entities::{CommentRecord, UserRecord};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("unknown post")]
    UnknownPost,
    #[error("comment validation failed")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostsRepo>, comments: Arc<dyn CommentsRepo>) -> Self {
        Self { posts, comments }
    }

    /// Append a comment to a post. Validation failures persist nothing.
    pub async fn add_comment(
        &self,
        author: &UserRecord,
        post_id: uuid::Uuid,
        input: CommentInput,
    ) -> Result<CommentRecord, CommentError> {
        let valid = input.validate().map_err(CommentError::Invalid)?;

        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(CommentError::UnknownPost)?;

        let comment = self
            .comments
            .insert_comment(NewCommentParams {
                post_id: post.id,
                author_id: author.id,
                text: valid.text,
            })
            .await?;

        debug!(
            post_id = %post.id,
            author = %author.username,
            "comment appended"
        );

        Ok(comment)
    }
}
