// src/services/post_services.rs
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use crate::dtos::post_dtos::UpdatePostDTO;
use crate::error::{AppError, AppResult};
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::middleware::upload_guard::ImageUpload;
use crate::models::post::{NewPost, Post, PostChanges};
use crate::repositories::post_repository::PostRepository;
use crate::services::image_storage::{file_name_from_url, ImageStorage};

/// Input for [`PostService::create`], whichever body format it came from.
#[derive(Debug, Default)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}

/// Author-only mutation rule. Evaluated on every update and delete.
pub fn authorize_mutation(post: &Post, caller: &AuthenticatedUser) -> AppResult<()> {
    if post.is_authored_by(caller.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not authorized to modify this post".into()))
    }
}

fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Unknown and malformed ids both resolve to "not found".
pub fn parse_post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound("Post not found".into()))
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    images: Arc<dyn ImageStorage>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, images: Arc<dyn ImageStorage>) -> Self {
        Self { repo, images }
    }

    pub async fn create(&self, caller: &AuthenticatedUser, input: CreatePostInput) -> AppResult<Post> {
        let title = required(&input.title, "Title")?;
        let content = required(&input.content, "Content")?;

        let image_url = match &input.image {
            Some(upload) => Some(self.images.store(upload).await?),
            None => None,
        };

        let new_post = NewPost {
            id: Uuid::new_v4(),
            title,
            content,
            author: caller.author_ref(),
            image_url: image_url.clone(),
            created_at: Utc::now(),
        };

        match self.repo.insert(new_post).await {
            Ok(post) => {
                info!("user {} created post {}", caller.user_id, post.id);
                Ok(post)
            }
            Err(e) => {
                // don't leave an orphaned image behind
                if let Some(name) = image_url.as_deref().and_then(file_name_from_url) {
                    if let Err(e) = self.images.remove(name).await {
                        warn!("failed to remove image {} after insert error: {}", name, e);
                    }
                }
                Err(e.into())
            }
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Post>> {
        Ok(self.repo.list().await?)
    }

    pub async fn list_mine(&self, caller: &AuthenticatedUser) -> AppResult<Vec<Post>> {
        Ok(self.repo.list_by_author(caller.user_id).await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Post> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))
    }

    pub async fn update(&self, caller: &AuthenticatedUser, id: Uuid, dto: UpdatePostDTO) -> AppResult<Post> {
        let post = self.get(id).await?;
        authorize_mutation(&post, caller)?;

        if dto.title.is_none() && dto.content.is_none() {
            return Err(AppError::Validation("Nothing to update: provide title or content".into()));
        }
        let changes = PostChanges {
            title: dto.title.as_deref().map(|t| required(t, "Title")).transpose()?,
            content: dto.content.as_deref().map(|c| required(c, "Content")).transpose()?,
            updated_at: Some(Utc::now()),
        };

        let updated = self
            .repo
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
        info!("user {} updated post {}", caller.user_id, id);
        Ok(updated)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        let post = self.get(id).await?;
        authorize_mutation(&post, caller)?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Post not found".into()));
        }
        info!("user {} deleted post {}", caller.user_id, id);

        if let Some(name) = post.image_url.as_deref().and_then(file_name_from_url) {
            if let Err(e) = self.images.remove(name).await {
                warn!("failed to remove image {} of deleted post {}: {}", name, id, e);
            }
        }
        Ok(())
    }

    pub async fn load_image(&self, file_name: &str) -> AppResult<Vec<u8>> {
        self.images
            .load(file_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::post_memory_repo::MemoryPostRepository;
    use crate::repositories::post_repository::RepoError;
    use crate::services::image_storage::MemoryImageStorage;

    fn user(name: &str) -> AuthenticatedUser {
        AuthenticatedUser { user_id: Uuid::new_v4(), username: Some(name.into()), email: None }
    }

    fn service() -> (PostService, Arc<MemoryImageStorage>) {
        let images = Arc::new(MemoryImageStorage::new());
        (PostService::new(Arc::new(MemoryPostRepository::new()), images.clone()), images)
    }

    fn input(title: &str, content: &str) -> CreatePostInput {
        CreatePostInput { title: title.into(), content: content.into(), image: None }
    }

    #[tokio::test]
    async fn create_sets_author_and_timestamp() {
        let (svc, _) = service();
        let ana = user("ana");
        let before = Utc::now();

        let post = svc.create(&ana, input("  Hello ", "World")).await.unwrap();

        assert_eq!(post.author.id, ana.user_id);
        assert_eq!(post.author.username.as_deref(), Some("ana"));
        assert_eq!(post.title, "Hello");
        assert!(post.created_at >= before);
    }

    #[tokio::test]
    async fn create_requires_title_and_content() {
        let (svc, _) = service();
        let ana = user("ana");
        assert!(matches!(svc.create(&ana, input("", "x")).await, Err(AppError::Validation(_))));
        assert!(matches!(svc.create(&ana, input("x", "   ")).await, Err(AppError::Validation(_))));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_author_may_mutate() {
        let (svc, _) = service();
        let ana = user("ana");
        let ben = user("ben");
        let post = svc.create(&ana, input("Hello", "World")).await.unwrap();

        let dto = UpdatePostDTO { title: Some("hijacked".into()), content: None };
        assert!(matches!(svc.update(&ben, post.id, dto).await, Err(AppError::Forbidden(_))));
        assert!(matches!(svc.delete(&ben, post.id).await, Err(AppError::Forbidden(_))));
        assert_eq!(svc.get(post.id).await.unwrap().title, "Hello");

        let dto = UpdatePostDTO { title: Some("Hi".into()), content: None };
        let updated = svc.update(&ana, post.id, dto).await.unwrap();
        assert_eq!(updated.title, "Hi");
        assert_eq!(updated.content, "World");

        svc.delete(&ana, post.id).await.unwrap();
        assert!(matches!(svc.get(post.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_rejects_empty_changes() {
        let (svc, _) = service();
        let ana = user("ana");
        let post = svc.create(&ana, input("Hello", "World")).await.unwrap();

        let res = svc.update(&ana, post.id, UpdatePostDTO::default()).await;
        assert!(matches!(res, Err(AppError::Validation(_))));

        let blank = UpdatePostDTO { title: Some(" ".into()), content: None };
        assert!(matches!(svc.update(&ana, post.id, blank).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_post_is_not_found_before_ownership() {
        let (svc, _) = service();
        let res = svc.delete(&user("ana"), Uuid::new_v4()).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_stored_image() {
        let (svc, images) = service();
        let ana = user("ana");
        let upload = ImageUpload {
            file_name: Some("cat.png".into()),
            content_type: mime::IMAGE_PNG,
            bytes: vec![1, 2, 3].into(),
        };
        let post = svc
            .create(&ana, CreatePostInput { image: Some(upload), ..input("Cat", "Look") })
            .await
            .unwrap();
        assert!(post.image_url.is_some());
        assert_eq!(images.len().await, 1);

        svc.delete(&ana, post.id).await.unwrap();
        assert!(images.is_empty().await);
    }

    struct BrokenRepo;

    #[async_trait::async_trait]
    impl PostRepository for BrokenRepo {
        async fn insert(&self, _post: NewPost) -> Result<Post, RepoError> {
            Err(RepoError::Other("disk full".into()))
        }
        async fn list(&self) -> Result<Vec<Post>, RepoError> {
            Ok(vec![])
        }
        async fn list_by_author(&self, _author_id: Uuid) -> Result<Vec<Post>, RepoError> {
            Ok(vec![])
        }
        async fn find(&self, _id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }
        async fn update(&self, _id: Uuid, _changes: PostChanges) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }
        async fn delete(&self, _id: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn failed_insert_removes_the_stored_image() {
        let images = Arc::new(MemoryImageStorage::new());
        let svc = PostService::new(Arc::new(BrokenRepo), images.clone());
        let upload = ImageUpload {
            file_name: Some("cat.png".into()),
            content_type: mime::IMAGE_PNG,
            bytes: vec![1, 2, 3].into(),
        };

        let res = svc
            .create(&user("ana"), CreatePostInput { image: Some(upload), ..input("Cat", "Look") })
            .await;
        assert!(matches!(res, Err(AppError::Repository(_))));
        assert!(images.is_empty().await);
    }

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_post_id("abc"), Err(AppError::NotFound(_))));
        assert!(parse_post_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
