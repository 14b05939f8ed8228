// src/handlers/post_handlers.rs
use actix_web::guard::GuardContext;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{delete, get, post, put, web, HttpResponse};
use log::debug;

use crate::dtos::post_dtos::{
    CreatePostDTO, MessageResponse, PostResponse, PostsResponse, UpdatePostDTO,
};
use crate::error::AppResult;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::middleware::upload_guard::PostForm;
use crate::services::post_services::{parse_post_id, CreatePostInput, PostService};

/// Routes multipart bodies to [`create_post_with_image`].
pub fn is_multipart(ctx: &GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// POST /api/posts (multipart: title, content, image)
#[post("/posts", guard = "is_multipart")]
pub async fn create_post_with_image(
    svc: web::Data<PostService>,
    user: AuthenticatedUser,
    form: PostForm,
) -> AppResult<HttpResponse> {
    let input = CreatePostInput {
        title: form.title.unwrap_or_default(),
        content: form.content.unwrap_or_default(),
        image: form.image,
    };
    let post = svc.create(&user, input).await?;
    Ok(HttpResponse::Created().json(PostResponse::new("Post created successfully", post)))
}

/// POST /api/posts (JSON)
#[post("/posts")]
pub async fn create_post(
    svc: web::Data<PostService>,
    user: AuthenticatedUser,
    body: web::Json<CreatePostDTO>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let input = CreatePostInput { title: body.title, content: body.content, image: None };
    let post = svc.create(&user, input).await?;
    Ok(HttpResponse::Created().json(PostResponse::new("Post created successfully", post)))
}

/// GET /api/posts
#[get("/posts")]
pub async fn list_posts(svc: web::Data<PostService>) -> AppResult<HttpResponse> {
    let posts = svc.list().await?;
    debug!("listing {} posts", posts.len());
    Ok(HttpResponse::Ok().json(PostsResponse::new("Posts retrieved successfully", posts)))
}

/// GET /api/posts/my/posts
#[get("/posts/my/posts")]
pub async fn list_my_posts(
    svc: web::Data<PostService>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let posts = svc.list_mine(&user).await?;
    Ok(HttpResponse::Ok().json(PostsResponse::new("Your posts retrieved successfully", posts)))
}

/// GET /api/posts/{id}
#[get("/posts/{id}")]
pub async fn get_post(
    svc: web::Data<PostService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = svc.get(id).await?;
    Ok(HttpResponse::Ok().json(PostResponse::new("Post retrieved successfully", post)))
}

/// PUT /api/posts/{id}
#[put("/posts/{id}")]
pub async fn update_post(
    svc: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<UpdatePostDTO>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = svc.update(&user, id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostResponse::new("Post updated successfully", post)))
}

/// DELETE /api/posts/{id}
#[delete("/posts/{id}")]
pub async fn delete_post(
    svc: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    svc.delete(&user, id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}
