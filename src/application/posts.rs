//! Post authoring: create, edit, delete.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::forms::{FieldErrors, PostInput};
use crate::application::repos::{
    GroupsRepo, NewPostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::cache::FeedCache;
use crate::domain::entities::{PostRecord, UserRecord};
use crate::domain::posts::short_label;

#[derive(Debug, Error)]
pub enum PostActionError {
    #[error("unknown post")]
    UnknownPost,
    #[error("unknown group")]
    UnknownGroup,
    #[error("only the author may edit a post")]
    NotAuthor,
    #[error("post validation failed")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    posts_write: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
    cache: Arc<FeedCache>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        posts_write: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
        cache: Arc<FeedCache>,
    ) -> Self {
        Self {
            posts,
            posts_write,
            groups,
            cache,
        }
    }

    /// Create a post for `author`. The record and its author assignment
    /// commit together; the feed cache is flushed per policy afterwards.
    pub async fn create(
        &self,
        author: &UserRecord,
        input: PostInput,
    ) -> Result<PostRecord, PostActionError> {
        let valid = input.validate().map_err(PostActionError::Invalid)?;
        self.check_group(valid.group_id).await?;

        let post = self
            .posts_write
            .create_post(NewPostParams {
                author_id: author.id,
                group_id: valid.group_id,
                text: valid.text,
                image_ref: valid.image_ref,
            })
            .await?;

        self.cache.on_post_created();

        info!(
            post_id = %post.id,
            author = %author.username,
            label = %short_label(&post.text),
            "post created"
        );

        Ok(post)
    }

    /// Update text/group/image of an existing post. Author and creation
    /// timestamp never change; a non-author editor is rejected before
    /// validation so the caller can soft-deny with a redirect.
    pub async fn edit(
        &self,
        editor: &UserRecord,
        post_id: uuid::Uuid,
        input: PostInput,
    ) -> Result<PostRecord, PostActionError> {
        let existing = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(PostActionError::UnknownPost)?;

        if existing.author_id != editor.id {
            return Err(PostActionError::NotAuthor);
        }

        let valid = input.validate().map_err(PostActionError::Invalid)?;
        self.check_group(valid.group_id).await?;

        let post = self
            .posts_write
            .update_post(UpdatePostParams {
                id: existing.id,
                group_id: valid.group_id,
                text: valid.text,
                image_ref: valid.image_ref,
            })
            .await?;

        info!(
            post_id = %post.id,
            label = %short_label(&post.text),
            "post updated"
        );

        Ok(post)
    }

    /// Delete a post. Cache handling follows the configured invalidation
    /// policy; the observed default leaves the TTL window in place.
    pub async fn delete(&self, post_id: uuid::Uuid) -> Result<(), PostActionError> {
        let existing = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(PostActionError::UnknownPost)?;

        self.posts_write.delete_post(existing.id).await?;
        self.cache.on_post_deleted();

        info!(post_id = %existing.id, "post deleted");

        Ok(())
    }

    async fn check_group(&self, group_id: Option<uuid::Uuid>) -> Result<(), PostActionError> {
        if let Some(id) = group_id {
            self.groups
                .find_by_id(id)
                .await?
                .ok_or(PostActionError::UnknownGroup)?;
        }
        Ok(())
    }
}
