// src/feed/client.rs
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::post::Post;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("You need to be logged in to do that.")]
    NotLoggedIn,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded {status}: {message:?}")]
    Api { status: u16, message: Option<String> },
}

impl ClientError {
    /// Text to show the user: the server's own message when it sent one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::NotLoggedIn => self.to_string(),
            ClientError::Api { message: Some(msg), .. } => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// A post as typed by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }

    /// Trimmed title and content, or a validation error if either is blank.
    pub fn validate(&self) -> Result<(String, String), ClientError> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(ClientError::Validation(
                "Add a title and something to share before posting!".into(),
            ));
        }
        Ok((title.to_string(), content.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Deserialize)]
struct PostEnvelope {
    #[serde(default)]
    post: Option<Post>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

/// HTTP client for the posts API.
#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl FeedClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let http = Client::builder().user_agent("postboard-feed/0.1").build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/posts{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn require_token(&self) -> Result<(), ClientError> {
        if self.token.is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        Ok(())
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body).ok().and_then(|e| e.message);
        debug!("request failed with {}: {}", status, body);
        Err(ClientError::Api { status: status.as_u16(), message })
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        let resp = self.authorize(self.http.get(self.url(""))).send().await?;
        let env: PostsEnvelope = Self::check(resp).await?.json().await?;
        Ok(env.posts)
    }

    pub async fn my_posts(&self) -> Result<Vec<Post>, ClientError> {
        self.require_token()?;
        let resp = self.authorize(self.http.get(self.url("/my/posts"))).send().await?;
        let env: PostsEnvelope = Self::check(resp).await?.json().await?;
        Ok(env.posts)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Option<Post>, ClientError> {
        let resp = self.authorize(self.http.get(self.url(&format!("/{}", id)))).send().await?;
        let env: PostEnvelope = Self::check(resp).await?.json().await?;
        Ok(env.post)
    }

    /// Creates a post. `Ok(None)` means the server accepted it but did not echo the entity.
    pub async fn create_post(
        &self,
        draft: &PostDraft,
        image: Option<ImageAttachment>,
    ) -> Result<Option<Post>, ClientError> {
        let (title, content) = draft.validate()?;
        self.require_token()?;

        let req = self.authorize(self.http.post(self.url("")));
        let req = match image {
            Some(image) => {
                let part = Part::bytes(image.bytes)
                    .file_name(image.file_name)
                    .mime_str(&image.content_type)?;
                req.multipart(Form::new().text("title", title).text("content", content).part("image", part))
            }
            None => req.json(&json!({ "title": title, "content": content })),
        };

        let resp = Self::check(req.send().await?).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str::<PostEnvelope>(&body).ok().and_then(|e| e.post))
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post, ClientError> {
        self.require_token()?;
        let body = json!({ "title": title, "content": content });
        let resp = self
            .authorize(self.http.put(self.url(&format!("/{}", id))))
            .json(&body)
            .send()
            .await?;
        let env: PostEnvelope = Self::check(resp).await?.json().await?;
        env.post.ok_or(ClientError::Api { status: 200, message: Some("Server did not return the post".into()) })
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        self.require_token()?;
        let resp = self.authorize(self.http.delete(self.url(&format!("/{}", id)))).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
