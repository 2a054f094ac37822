//! Read-side routes: feeds, profiles, post detail, health.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::HttpError;
use crate::application::feed::{FeedContext, Viewer};
use crate::application::pagination::PageNumber;
use crate::cache::feed_cache_layer;

use super::actions;
use super::middleware::{log_responses, set_request_context};
use super::{HttpState, db_health_response, require_user, resolve_viewer};

pub fn build_router(state: HttpState) -> Router {
    let cached_routes = Router::new().route("/", get(index));

    // The feed cache only intercepts the global timeline.
    let cached_routes = if let Some(cache_state) = state.cache.clone() {
        cached_routes.layer(middleware::from_fn_with_state(
            cache_state,
            feed_cache_layer,
        ))
    } else {
        cached_routes
    };

    let routes = Router::new()
        .route("/group/{slug}/", get(group_index))
        .route("/profile/{username}/", get(profile))
        .route("/posts/{id}/", get(post_detail))
        .route("/follow/", get(following_index))
        .route("/create/", axum::routing::post(actions::create_post))
        .route("/posts/{id}/edit/", axum::routing::post(actions::edit_post))
        .route(
            "/posts/{id}/comment/",
            axum::routing::post(actions::add_comment),
        )
        .route(
            "/profile/{username}/follow/",
            axum::routing::post(actions::follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            axum::routing::post(actions::unfollow),
        )
        .route("/_health/db", get(health));

    cached_routes
        .merge(routes)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> PageNumber {
        PageNumber::parse(self.page.as_deref())
    }
}

async fn index(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let viewer = match resolve_viewer(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(err) => return err.into_response(),
    };

    match state
        .feed
        .compose(FeedContext::Global, &viewer, query.number())
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn group_index(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let viewer = match resolve_viewer(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(err) => return err.into_response(),
    };

    match state
        .feed
        .compose(FeedContext::Group { slug }, &viewer, query.number())
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn profile(
    State(state): State<HttpState>,
    Path(username): Path<String>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let viewer = match resolve_viewer(&state, &headers).await {
        Ok(viewer) => viewer,
        Err(err) => return err.into_response(),
    };

    match state
        .feed
        .compose(FeedContext::Author { username }, &viewer, query.number())
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.feed.post_detail(id).await {
        Ok(Some(detail)) => Json(detail).into_response(),
        Ok(None) => HttpError::not_found(
            "infra::http::post_detail",
            "Post id did not match any known post",
        )
        .into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn following_index(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let user = match require_user(&state, &headers, "/follow/").await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let viewer = Viewer::User(user);
    match state
        .feed
        .compose(FeedContext::Following, &viewer, query.number())
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}
