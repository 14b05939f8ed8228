use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author reference stored with a post. Set once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorRef,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row to insert. `id` and `created_at` are assigned by the service, never by the caller.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorRef,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Field changes for an update. There is deliberately no author field.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author.id == user_id
    }

    pub(crate) fn apply(&mut self, changes: &PostChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
        if changes.updated_at.is_some() {
            self.updated_at = changes.updated_at;
        }
    }
}

impl From<NewPost> for Post {
    fn from(p: NewPost) -> Self {
        Post {
            id: p.id,
            title: p.title,
            content: p.content,
            author: p.author,
            image_url: p.image_url,
            created_at: p.created_at,
            updated_at: None,
        }
    }
}
