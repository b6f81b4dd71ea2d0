use reqwest::StatusCode;
use shared::domain::PostId;
use thiserror::Error;

/// Why a single HTTP exchange did not produce a usable response.
///
/// Kept for logging only: callers never branch on the status code.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid {service} service url '{url}': {source}")]
    Invalid {
        service: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{service} service url '{url}' must use http or https")]
    UnsupportedScheme { service: &'static str, url: String },
}

/// One failure kind per endpoint.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("registration failed: {0}")]
    RegistrationFailed(#[source] RequestFailure),
    #[error("no user found for email {email}")]
    UserNotFound {
        email: String,
        #[source]
        cause: Option<RequestFailure>,
    },
    #[error("posts unavailable: {0}")]
    PostsUnavailable(#[source] RequestFailure),
    #[error("post creation failed: {0}")]
    PostCreateFailed(#[source] RequestFailure),
    #[error("post deletion failed: {0}")]
    PostDeleteFailed(#[source] RequestFailure),
    #[error("comments unavailable: {0}")]
    CommentsUnavailable(#[source] RequestFailure),
    #[error("comment creation failed: {0}")]
    CommentCreateFailed(#[source] RequestFailure),
}

/// Local rejections raised by the orchestrator before any request is sent,
/// plus service failures surfaced by an action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no user is logged in")]
    NotLoggedIn,
    #[error("no post is selected")]
    NoSelection,
    #[error("comment is empty")]
    EmptyComment,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("post {0} is not in the collection")]
    UnknownPost(PostId),
    #[error("post {0} does not belong to the session user")]
    NotAuthor(PostId),
    #[error(transparent)]
    Service(#[from] ServiceError),
}
