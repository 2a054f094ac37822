//! Shared in-memory store harness for behavior tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use vireo::application::comments::CommentService;
use vireo::application::feed::FeedService;
use vireo::application::follows::FollowService;
use vireo::application::identity::{IdentityResolver, StoreIdentity};
use vireo::application::pagination::DEFAULT_PAGE_SIZE;
use vireo::application::posts::PostService;
use vireo::application::repos::{
    CommentsRepo, FollowsRepo, GroupsRepo, HealthRepo, NewCommentParams, NewPostParams, PostsRepo,
    PostsWriteRepo, RepoError, UpdatePostParams, UsersRepo,
};
use vireo::cache::{CacheConfig, CacheState, FeedCache};
use vireo::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};
use vireo::domain::posts::newest_first;
use vireo::infra::http::{HttpState, build_router};

#[derive(Default)]
struct Inner {
    users: Vec<UserRecord>,
    groups: Vec<GroupRecord>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    follows: HashSet<(Uuid, Uuid)>,
    next_seq: i64,
}

impl Inner {
    fn next_seq(&mut self) -> i64 {
        self.next_seq += 1;
        self.next_seq
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, username: &str) -> UserRecord {
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.inner.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_group(&self, title: &str, slug: &str, description: &str) -> GroupRecord {
        let group = GroupRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.inner.lock().unwrap().groups.push(group.clone());
        group
    }

    pub fn add_post(&self, author: &UserRecord, text: &str, group: Option<&GroupRecord>) -> PostRecord {
        self.add_post_at(author, text, group, OffsetDateTime::now_utc())
    }

    pub fn add_post_at(
        &self,
        author: &UserRecord,
        text: &str,
        group: Option<&GroupRecord>,
        created_at: OffsetDateTime,
    ) -> PostRecord {
        let mut inner = self.inner.lock().unwrap();
        let post = PostRecord {
            id: Uuid::new_v4(),
            seq: inner.next_seq(),
            author_id: author.id,
            group_id: group.map(|g| g.id),
            text: text.to_string(),
            image_ref: None,
            created_at,
        };
        inner.posts.push(post.clone());
        post
    }

    pub fn post_count(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.inner.lock().unwrap().comments.len()
    }

    pub fn follow_edge_count(&self) -> usize {
        self.inner.lock().unwrap().follows.len()
    }

    fn ordered(&self, mut posts: Vec<PostRecord>) -> Vec<PostRecord> {
        posts.sort_by(newest_first);
        posts
    }
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|user| user.id == id).cloned())
    }
}

#[async_trait]
impl GroupsRepo for MemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.groups.iter().find(|group| group.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupRecord>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.groups.iter().find(|group| group.id == id).cloned())
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError> {
        let posts = self.inner.lock().unwrap().posts.clone();
        Ok(self.ordered(posts))
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let posts: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|post| post.group_id == Some(group_id))
            .cloned()
            .collect();
        Ok(self.ordered(posts))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let posts: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect();
        Ok(self.ordered(posts))
    }

    async fn list_by_authors(&self, author_ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError> {
        let posts: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|post| author_ids.contains(&post.author_id))
            .cloned()
            .collect();
        Ok(self.ordered(posts))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .posts
            .iter()
            .filter(|post| post.author_id == author_id)
            .count() as u64)
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn create_post(&self, params: NewPostParams) -> Result<PostRecord, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        let post = PostRecord {
            id: Uuid::new_v4(),
            seq: inner.next_seq(),
            author_id: params.author_id,
            group_id: params.group_id,
            text: params.text,
            image_ref: params.image_ref,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        let post = inner
            .posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.group_id = params.group_id;
        post.text = params.text;
        post.image_ref = params.image_ref;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.inner.lock().unwrap();
        inner.posts.retain(|post| post.id != id);
        inner.comments.retain(|comment| comment.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for MemoryStore {
    async fn insert_comment(&self, params: NewCommentParams) -> Result<CommentRecord, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            seq: inner.next_seq(),
            post_id: params.post_id,
            author_id: params.author_id,
            text: params.text,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError> {
        let mut comments: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.seq.cmp(&b.seq)));
        Ok(comments)
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .count() as u64)
    }
}

#[async_trait]
impl FollowsRepo for MemoryStore {
    async fn insert_edge(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.follows.insert((follower_id, followee_id)))
    }

    async fn delete_edge(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.inner.lock().unwrap();
        inner.follows.remove(&(follower_id, followee_id));
        Ok(())
    }

    async fn edge_exists(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.follows.contains(&(follower_id, followee_id)))
    }

    async fn followees_of(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .follows
            .iter()
            .filter(|(follower, _)| *follower == follower_id)
            .map(|(_, followee)| *followee)
            .collect())
    }
}

#[async_trait]
impl HealthRepo for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Service bundle wired to one shared store, mirroring the binary's wiring.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<FeedCache>,
    pub state: HttpState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_cache_config(CacheConfig::default())
    }

    pub fn with_cache_config(cache_config: CacheConfig) -> Self {
        let store = MemoryStore::new();
        let cache = Arc::new(FeedCache::new(cache_config.clone()));

        let feed = Arc::new(FeedService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            DEFAULT_PAGE_SIZE,
        ));
        let posts = Arc::new(PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            cache.clone(),
        ));
        let comments = Arc::new(CommentService::new(store.clone(), store.clone()));
        let follows = Arc::new(FollowService::new(store.clone(), store.clone()));
        let identity: Arc<dyn IdentityResolver> = Arc::new(StoreIdentity::new(store.clone()));

        let cache_state = cache_config.enabled.then(|| CacheState {
            store: cache.clone(),
        });

        let state = HttpState {
            feed,
            posts,
            comments,
            follows,
            identity,
            health: store.clone(),
            cache: cache_state,
        };

        Self {
            store,
            cache,
            state,
        }
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }
}
