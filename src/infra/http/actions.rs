//! Write-side routes: post authoring, comments, follow edges.
//!
//! Every route is login-gated. Successful actions answer with the
//! redirect the browser flow expects; validation failures re-render with
//! field errors and persist nothing.

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::application::comments::CommentError;
use crate::application::error::{HttpError, validation_response};
use crate::application::forms::{CommentInput, PostInput};
use crate::application::posts::PostActionError;

use super::{HttpState, require_user};

fn detail_path(id: Uuid) -> String {
    format!("/posts/{id}/")
}

fn profile_path(username: &str) -> String {
    format!("/profile/{username}/")
}

pub async fn create_post(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(input): Json<PostInput>,
) -> Response {
    let user = match require_user(&state, &headers, "/create/").await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.posts.create(&user, input).await {
        Ok(_) => Redirect::to(&profile_path(&user.username)).into_response(),
        Err(PostActionError::Invalid(errors)) => validation_response(&errors),
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub async fn edit_post(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<PostInput>,
) -> Response {
    let destination = format!("/posts/{id}/edit/");
    let user = match require_user(&state, &headers, &destination).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.posts.edit(&user, id, input).await {
        Ok(post) => Redirect::to(&detail_path(post.id)).into_response(),
        // Soft-deny: a non-author lands back on the detail view.
        Err(PostActionError::NotAuthor) => Redirect::to(&detail_path(id)).into_response(),
        Err(PostActionError::Invalid(errors)) => validation_response(&errors),
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub async fn add_comment(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<CommentInput>,
) -> Response {
    let destination = format!("/posts/{id}/comment/");
    let user = match require_user(&state, &headers, &destination).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.comments.add_comment(&user, id, input).await {
        Ok(comment) => Redirect::to(&detail_path(comment.post_id)).into_response(),
        Err(CommentError::Invalid(errors)) => validation_response(&errors),
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub async fn follow(
    State(state): State<HttpState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Response {
    let destination = format!("/profile/{username}/follow/");
    let user = match require_user(&state, &headers, &destination).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.follows.follow(&user, &username).await {
        Ok(()) => Redirect::to(&profile_path(&username)).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub async fn unfollow(
    State(state): State<HttpState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Response {
    let destination = format!("/profile/{username}/unfollow/");
    let user = match require_user(&state, &headers, &destination).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.follows.unfollow(&user, &username).await {
        Ok(()) => Redirect::to(&profile_path(&username)).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}
