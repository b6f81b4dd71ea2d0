//! HTTP access to the user, post and comment services.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Comment, Post, PostId, User, UserId},
    protocol::{
        post_comments_route, post_route, NewComment, NewPost, NewUser, COMMENTS_ROUTE,
        POSTS_ROUTE, USERS_ROUTE,
    },
};
use tracing::debug;
use url::Url;

use crate::error::{EndpointError, RequestFailure, ServiceError};

/// Base URLs of the three backend services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    user: Url,
    post: Url,
    comment: Url,
}

impl ServiceEndpoints {
    pub fn new(user: &str, post: &str, comment: &str) -> Result<Self, EndpointError> {
        Ok(Self {
            user: parse_base_url("user", user)?,
            post: parse_base_url("post", post)?,
            comment: parse_base_url("comment", comment)?,
        })
    }

    pub fn user_service(&self) -> &Url {
        &self.user
    }

    pub fn post_service(&self) -> &Url {
        &self.post
    }

    pub fn comment_service(&self) -> &Url {
        &self.comment
    }

    fn user_url(&self, route: &str) -> String {
        join_route(&self.user, route)
    }

    fn post_url(&self, route: &str) -> String {
        join_route(&self.post, route)
    }

    fn comment_url(&self, route: &str) -> String {
        join_route(&self.comment, route)
    }
}

fn parse_base_url(service: &'static str, raw: &str) -> Result<Url, EndpointError> {
    let url = Url::parse(raw.trim()).map_err(|source| EndpointError::Invalid {
        service,
        url: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(EndpointError::UnsupportedScheme {
            service,
            url: raw.to_string(),
        });
    }
    Ok(url)
}

// Appends rather than `Url::join`s so a base path prefix survives.
fn join_route(base: &Url, route: &str) -> String {
    format!("{}{route}", base.as_str().trim_end_matches('/'))
}

#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn register_profile(&self, profile: NewUser) -> Result<User, ServiceError>;

    /// The password is accepted for parity with the login form; the user
    /// service has no credential field.
    async fn register(
        &self,
        username: &str,
        email: &str,
        _password: &str,
    ) -> Result<User, ServiceError> {
        self.register_profile(NewUser::basic(username, email)).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, ServiceError>;
    async fn list_posts(&self) -> Result<Vec<Post>, ServiceError>;
    async fn create_post(
        &self,
        title: &str,
        content: &str,
        author_id: UserId,
    ) -> Result<Post, ServiceError>;
    async fn delete_post(&self, post_id: PostId) -> Result<(), ServiceError>;
    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, ServiceError>;
    async fn create_comment(
        &self,
        post_id: PostId,
        content: &str,
        author_id: UserId,
    ) -> Result<Comment, ServiceError>;
}

pub struct HttpBlogClient {
    http: Client,
    endpoints: ServiceEndpoints,
}

impl HttpBlogClient {
    pub fn new(endpoints: ServiceEndpoints) -> Self {
        Self::with_http(Client::new(), endpoints)
    }

    pub fn with_http(http: Client, endpoints: ServiceEndpoints) -> Self {
        Self { http, endpoints }
    }
}

async fn send_checked(request: RequestBuilder) -> Result<Response, RequestFailure> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RequestFailure::Status(status));
    }
    Ok(response)
}

async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RequestFailure> {
    let response = send_checked(request).await?;
    Ok(response.json::<T>().await?)
}

/// Login has no credential check: the session user is whoever owns the email.
pub fn find_user_by_email(users: Vec<User>, email: &str) -> Option<User> {
    let email = email.trim();
    users.into_iter().find(|user| user.email == email)
}

#[async_trait]
impl BlogApi for HttpBlogClient {
    async fn register_profile(&self, profile: NewUser) -> Result<User, ServiceError> {
        let url = self.endpoints.user_url(USERS_ROUTE);
        debug!(%url, username = %profile.username, "registering user");
        fetch_json(self.http.post(url).json(&profile))
            .await
            .map_err(ServiceError::RegistrationFailed)
    }

    async fn login(&self, email: &str, _password: &str) -> Result<User, ServiceError> {
        let url = self.endpoints.user_url(USERS_ROUTE);
        debug!(%url, "fetching user directory for login");
        let users: Vec<User> =
            fetch_json(self.http.get(url))
                .await
                .map_err(|cause| ServiceError::UserNotFound {
                    email: email.to_string(),
                    cause: Some(cause),
                })?;
        find_user_by_email(users, email).ok_or_else(|| ServiceError::UserNotFound {
            email: email.to_string(),
            cause: None,
        })
    }

    async fn list_posts(&self) -> Result<Vec<Post>, ServiceError> {
        let url = self.endpoints.post_url(POSTS_ROUTE);
        debug!(%url, "listing posts");
        fetch_json(self.http.get(url))
            .await
            .map_err(ServiceError::PostsUnavailable)
    }

    async fn create_post(
        &self,
        title: &str,
        content: &str,
        author_id: UserId,
    ) -> Result<Post, ServiceError> {
        let url = self.endpoints.post_url(POSTS_ROUTE);
        debug!(%url, author_id = author_id.0, "creating post");
        let body = NewPost {
            title: title.to_string(),
            content: content.to_string(),
            author_id,
        };
        fetch_json(self.http.post(url).json(&body))
            .await
            .map_err(ServiceError::PostCreateFailed)
    }

    async fn delete_post(&self, post_id: PostId) -> Result<(), ServiceError> {
        let url = self.endpoints.post_url(&post_route(post_id));
        debug!(%url, "deleting post");
        send_checked(self.http.delete(url))
            .await
            .map(|_| ())
            .map_err(ServiceError::PostDeleteFailed)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, ServiceError> {
        let url = self.endpoints.comment_url(&post_comments_route(post_id));
        debug!(%url, "listing comments");
        fetch_json(self.http.get(url))
            .await
            .map_err(ServiceError::CommentsUnavailable)
    }

    async fn create_comment(
        &self,
        post_id: PostId,
        content: &str,
        author_id: UserId,
    ) -> Result<Comment, ServiceError> {
        let url = self.endpoints.comment_url(COMMENTS_ROUTE);
        debug!(%url, post_id = post_id.0, author_id = author_id.0, "creating comment");
        let body = NewComment {
            content: content.to_string(),
            post_id,
            author_id,
        };
        fetch_json(self.http.post(url).json(&body))
            .await
            .map_err(ServiceError::CommentCreateFailed)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
