//! Request bodies sent to the user, post and comment services.

use serde::{Deserialize, Serialize};

use crate::domain::{PostId, UserId};

pub const USERS_ROUTE: &str = "/api/v1/users";
pub const POSTS_ROUTE: &str = "/api/v1/posts";
pub const COMMENTS_ROUTE: &str = "/api/v1/comments";

pub fn post_route(post_id: PostId) -> String {
    format!("{POSTS_ROUTE}/{}", post_id.0)
}

pub fn post_comments_route(post_id: PostId) -> String {
    format!("{COMMENTS_ROUTE}/post/{}", post_id.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
}

impl NewUser {
    /// Profile with the display name defaulted to the username and an empty bio.
    pub fn basic(username: impl Into<String>, email: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            full_name: username.clone(),
            username,
            email: email.into(),
            bio: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub post_id: PostId,
    pub author_id: UserId,
}
