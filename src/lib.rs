pub mod config;
pub mod dtos;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

use actix_web::{get, web, HttpResponse};

use crate::error::AppError;
use crate::handlers::post_handlers::{
    create_post, create_post_with_image, delete_post, get_post, list_my_posts, list_posts,
    update_post,
};
use crate::handlers::upload_handlers::serve_post_image;

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Registers every route plus the JSON error mapping.
///
/// Expects `web::Data<PostService>` and `web::Data<TokenVerifier>` to be
/// provided as app data by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_cfg = web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into());

    cfg.app_data(json_cfg).service(health).service(
        web::scope("/api")
            .service(create_post_with_image) // POST /api/posts (multipart)
            .service(create_post) // POST /api/posts
            .service(list_posts) // GET /api/posts
            .service(list_my_posts) // GET /api/posts/my/posts
            .service(get_post) // GET /api/posts/{id}
            .service(update_post) // PUT /api/posts/{id}
            .service(delete_post) // DELETE /api/posts/{id}
            .service(serve_post_image), // GET /api/uploads/posts/{filename}
    );
}
