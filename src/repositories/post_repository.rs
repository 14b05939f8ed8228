// src/repositories/post_repository.rs
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::post::{NewPost, Post, PostChanges};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("other: {0}")]
    Other(String),
}

/// Persistence for posts. Listing methods return newest first.
///
/// `update` and `delete` act on a single row and report whether it existed;
/// ownership is checked by the caller before either is invoked.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn find(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}
