// src/repositories/post_memory_repo.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::post::{NewPost, Post, PostChanges};
use crate::repositories::post_repository::{PostRepository, RepoError};

/// In-process store, used for local development (`POST_STORE=memory`) and tests.
#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    posts
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let post = Post::from(post);
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Other(format!("duplicate post id {}", post.id)));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.values().cloned().collect()))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(newest_first(
            posts.values().filter(|p| p.is_authored_by(author_id)).cloned().collect(),
        ))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            post.apply(&changes);
            post.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}
