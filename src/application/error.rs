use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::application::comments::CommentError;
use crate::application::feed::FeedError;
use crate::application::follows::FollowError;
use crate::application::forms::FieldErrors;
use crate::application::posts::PostActionError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

pub const LOGIN_PATH: &str = "/auth/login/";

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Terminal HTTP outcome for a failed request.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn not_found(source: &'static str, detail: impl Into<String>) -> Self {
        Self::new(source, StatusCode::NOT_FOUND, "Not found", detail)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Validation outcome: re-render material, never partial persistence.
pub fn validation_response(errors: &FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": &errors.errors })),
    )
        .into_response()
}

/// Redirect an unauthenticated request to login, preserving where it was
/// headed.
pub fn login_redirect(next: &str) -> Response {
    Redirect::to(&format!("{LOGIN_PATH}?next={next}")).into_response()
}

impl From<FeedError> for HttpError {
    fn from(error: FeedError) -> Self {
        const SOURCE: &str = "infra::http::feed_error_to_http_error";
        match error {
            FeedError::UnknownGroup => {
                HttpError::not_found(SOURCE, "Group slug did not match any known group")
            }
            FeedError::UnknownAuthor => {
                HttpError::not_found(SOURCE, "Username did not match any known author")
            }
            FeedError::AuthRequired => HttpError::new(
                SOURCE,
                StatusCode::UNAUTHORIZED,
                "Authentication required",
                "Feed context requires an authenticated viewer",
            ),
            FeedError::Repo(err) => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err,
            ),
        }
    }
}

impl From<FollowError> for HttpError {
    fn from(error: FollowError) -> Self {
        const SOURCE: &str = "infra::http::follow_error_to_http_error";
        match error {
            FollowError::UnknownUser => {
                HttpError::not_found(SOURCE, "Username did not match any known user")
            }
            FollowError::Repo(err) => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err,
            ),
        }
    }
}

impl From<CommentError> for HttpError {
    fn from(error: CommentError) -> Self {
        const SOURCE: &str = "infra::http::comment_error_to_http_error";
        match error {
            CommentError::UnknownPost => {
                HttpError::not_found(SOURCE, "Post id did not match any known post")
            }
            CommentError::Invalid(_) => HttpError::new(
                SOURCE,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed",
                "Comment form failed validation",
            ),
            CommentError::Repo(err) => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err,
            ),
        }
    }
}

impl From<PostActionError> for HttpError {
    fn from(error: PostActionError) -> Self {
        const SOURCE: &str = "infra::http::post_error_to_http_error";
        match error {
            PostActionError::UnknownPost => {
                HttpError::not_found(SOURCE, "Post id did not match any known post")
            }
            PostActionError::UnknownGroup => {
                HttpError::not_found(SOURCE, "Group id did not match any known group")
            }
            PostActionError::NotAuthor => HttpError::new(
                SOURCE,
                StatusCode::FORBIDDEN,
                "Only the author may edit a post",
                "Editor is not the post author",
            ),
            PostActionError::Invalid(_) => HttpError::new(
                SOURCE,
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed",
                "Post form failed validation",
            ),
            PostActionError::Repo(err) => HttpError::from_error(
                SOURCE,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                &err,
            ),
        }
    }
}

/// Binary-level umbrella error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
