// src/handlers/upload_handlers.rs
use actix_web::{get, web, HttpResponse};

use crate::error::AppResult;
use crate::services::image_storage::{content_type_for, is_inline_safe};
use crate::services::post_services::PostService;

/// GET /api/uploads/posts/{filename}
/// Serves images attached to posts (public).
#[get("/uploads/posts/{filename}")]
pub async fn serve_post_image(
    svc: web::Data<PostService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let filename = path.into_inner();
    let data = svc.load_image(&filename).await?;
    let content_type = content_type_for(&filename);

    let mut resp = HttpResponse::Ok();
    resp.content_type(content_type)
        .insert_header(("Cache-Control", "public, max-age=86400"))
        .insert_header(("X-Content-Type-Options", "nosniff"))
        .insert_header(("Content-Security-Policy", "default-src 'none'; style-src 'unsafe-inline'"));
    // SVG can carry script; never render it inline from this origin
    if !is_inline_safe(content_type) {
        resp.insert_header(("Content-Disposition", format!("attachment; filename=\"{}\"", filename)));
    }
    Ok(resp.body(data))
}
