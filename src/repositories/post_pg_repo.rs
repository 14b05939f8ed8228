// src/repositories/post_pg_repo.rs
use async_trait::async_trait;
use deadpool_postgres::Pool;
use log::{debug, info};
use tokio_postgres::Row;
use uuid::Uuid;

use crate::models::post::{AuthorRef, NewPost, Post, PostChanges};
use crate::repositories::post_repository::{PostRepository, RepoError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS posts (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    author_id UUID NOT NULL,
    author_username TEXT,
    image_url TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS posts_author_created_idx ON posts (author_id, created_at DESC);
CREATE INDEX IF NOT EXISTS posts_created_idx ON posts (created_at DESC);
";

const COLUMNS: &str =
    "id, title, content, author_id, author_username, image_url, created_at, updated_at";

/// Posts table on Postgres, through the shared deadpool pool.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: Pool,
}

impl PgPostRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the posts table and its indexes when missing.
    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        let client = self.pool.get().await?;
        client.batch_execute(SCHEMA).await?;
        info!("posts schema ready");
        Ok(())
    }
}

fn post_from_row(row: &Row) -> Result<Post, RepoError> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: AuthorRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "INSERT INTO posts (id, title, content, author_id, author_username, image_url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &post.id,
                    &post.title,
                    &post.content,
                    &post.author.id,
                    &post.author.username,
                    &post.image_url,
                    &post.created_at,
                ],
            )
            .await?;
        debug!("inserted post {}", post.id);
        post_from_row(&row)
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {COLUMNS} FROM posts ORDER BY created_at DESC, id DESC");
        let rows = client.query(&sql, &[]).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "SELECT {COLUMNS} FROM posts WHERE author_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = client.query(&sql, &[&author_id]).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        let row = client.query_opt(&sql, &[&id]).await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!(
            "UPDATE posts
             SET title = COALESCE($2, title),
                 content = COALESCE($3, content),
                 updated_at = COALESCE($4, updated_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = client
            .query_opt(&sql, &[&id, &changes.title, &changes.content, &changes.updated_at])
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let client = self.pool.get().await?;
        let deleted = client.execute("DELETE FROM posts WHERE id = $1", &[&id]).await?;
        Ok(deleted > 0)
    }
}
