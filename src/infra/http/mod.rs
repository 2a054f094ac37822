mod actions;
mod middleware;
mod public;

pub use public::build_router;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::comments::CommentService;
use crate::application::error::{ErrorReport, HttpError, login_redirect};
use crate::application::feed::{FeedService, Viewer};
use crate::application::follows::FollowService;
use crate::application::identity::IdentityResolver;
use crate::application::posts::PostService;
use crate::application::repos::{HealthRepo, RepoError};
use crate::cache::CacheState;
use crate::domain::entities::UserRecord;

/// Header carrying the upstream-authenticated principal.
pub const IDENTITY_HEADER: &str = "x-vireo-user";

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub follows: Arc<FollowService>,
    pub identity: Arc<dyn IdentityResolver>,
    pub health: Arc<dyn HealthRepo>,
    pub cache: Option<CacheState>,
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Resolve the request's viewer from the identity header. Absent or
/// unknown principals browse anonymously.
async fn resolve_viewer(state: &HttpState, headers: &HeaderMap) -> Result<Viewer, HttpError> {
    let Some(principal) = headers
        .get(IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return Ok(Viewer::Anonymous);
    };

    let user = state.identity.resolve(principal).await.map_err(|err| {
        HttpError::from_error(
            "infra::http::resolve_viewer",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            &err,
        )
    })?;

    Ok(user.map(Viewer::User).unwrap_or(Viewer::Anonymous))
}

/// Gate a login-required route: anonymous viewers are redirected to login
/// with the intended destination preserved.
async fn require_user(
    state: &HttpState,
    headers: &HeaderMap,
    destination: &str,
) -> Result<UserRecord, Response> {
    match resolve_viewer(state, headers).await {
        Ok(Viewer::User(user)) => Ok(user),
        Ok(Viewer::Anonymous) => Err(login_redirect(destination)),
        Err(err) => Err(err.into_response()),
    }
}
