//! Feed composition: resolves a viewing context into an ordered,
//! paginated sequence of posts.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::application::pagination::{PageNumber, Paginated, paginate};
use crate::application::repos::{
    CommentsRepo, FollowsRepo, GroupsRepo, PostsRepo, RepoError, UsersRepo,
};
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

/// The requesting identity a feed is composed for.
#[derive(Debug, Clone)]
pub enum Viewer {
    Anonymous,
    User(UserRecord),
}

impl Viewer {
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Selection criterion for a listing.
#[derive(Debug, Clone)]
pub enum FeedContext {
    Global,
    Group { slug: String },
    Author { username: String },
    Following,
}

/// The resolved counterpart of a [`FeedContext`], carried alongside the
/// page so the consumer can render headers without extra lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedScope {
    Global,
    Group {
        group: GroupRecord,
    },
    Author {
        author: UserRecord,
        is_following: bool,
    },
    Following,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub scope: FeedScope,
    pub page: Paginated<PostRecord>,
}

/// Single-post view: the post, its author, the author's output so far,
/// and the post's comments oldest-first.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostRecord,
    pub author: UserRecord,
    pub author_post_count: u64,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("unknown group")]
    UnknownGroup,
    #[error("unknown author")]
    UnknownAuthor,
    #[error("authentication required")]
    AuthRequired,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct FeedService {
    users: Arc<dyn UsersRepo>,
    groups: Arc<dyn GroupsRepo>,
    posts: Arc<dyn PostsRepo>,
    comments: Arc<dyn CommentsRepo>,
    follows: Arc<dyn FollowsRepo>,
    page_size: usize,
}

impl FeedService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        groups: Arc<dyn GroupsRepo>,
        posts: Arc<dyn PostsRepo>,
        comments: Arc<dyn CommentsRepo>,
        follows: Arc<dyn FollowsRepo>,
        page_size: usize,
    ) -> Self {
        Self {
            users,
            groups,
            posts,
            comments,
            follows,
            page_size,
        }
    }

    /// Compose one page of the feed selected by `context`.
    ///
    /// Read-only. Unknown group slugs and usernames surface as lookup
    /// errors; the following feed requires an authenticated viewer.
    /// Out-of-range page numbers clamp to the nearest valid page.
    pub async fn compose(
        &self,
        context: FeedContext,
        viewer: &Viewer,
        page: PageNumber,
    ) -> Result<FeedPage, FeedError> {
        let (scope, posts) = match context {
            FeedContext::Global => {
                let posts = self.posts.list_all().await?;
                (FeedScope::Global, posts)
            }
            FeedContext::Group { slug } => {
                let group = self
                    .groups
                    .find_by_slug(&slug)
                    .await?
                    .ok_or(FeedError::UnknownGroup)?;
                let posts = self.posts.list_by_group(group.id).await?;
                (FeedScope::Group { group }, posts)
            }
            FeedContext::Author { username } => {
                let author = self
                    .users
                    .find_by_username(&username)
                    .await?
                    .ok_or(FeedError::UnknownAuthor)?;
                let is_following = match viewer.user() {
                    Some(user) => self.follows.edge_exists(user.id, author.id).await?,
                    None => false,
                };
                let posts = self.posts.list_by_author(author.id).await?;
                (
                    FeedScope::Author {
                        author,
                        is_following,
                    },
                    posts,
                )
            }
            FeedContext::Following => {
                let user = viewer.user().ok_or(FeedError::AuthRequired)?;
                let followees = self.follows.followees_of(user.id).await?;
                let posts = if followees.is_empty() {
                    Vec::new()
                } else {
                    self.posts.list_by_authors(&followees).await?
                };
                (FeedScope::Following, posts)
            }
        };

        Ok(FeedPage {
            scope,
            page: paginate(posts, self.page_size, page),
        })
    }

    /// Load the detail view for one post, or `None` when the id is unknown.
    pub async fn post_detail(&self, id: uuid::Uuid) -> Result<Option<PostDetail>, FeedError> {
        let Some(post) = self.posts.find_by_id(id).await? else {
            return Ok(None);
        };

        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or(FeedError::UnknownAuthor)?;
        let author_post_count = self.posts.count_by_author(author.id).await?;
        let comments = self.comments.list_for_post(post.id).await?;

        Ok(Some(PostDetail {
            post,
            author,
            author_post_count,
            comments,
        }))
    }
}
