use serde::{Deserialize, Serialize};

use crate::models::post::Post;

#[derive(Debug, Deserialize)]
pub struct CreatePostDTO {
    pub title: String,
    pub content: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostDTO {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub status: &'static str,
    pub message: String,
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub status: &'static str,
    pub message: String,
    pub count: usize,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl PostResponse {
    pub fn new(message: impl Into<String>, post: Post) -> Self {
        Self { status: "success", message: message.into(), post }
    }
}

impl PostsResponse {
    pub fn new(message: impl Into<String>, posts: Vec<Post>) -> Self {
        Self { status: "success", message: message.into(), count: posts.len(), posts }
    }
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: "success", message: message.into() }
    }
}
