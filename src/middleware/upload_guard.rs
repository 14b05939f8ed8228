// src/middleware/upload_guard.rs
//
// Multipart extractor for post creation. Everything here runs before the
// handler body: a rejected upload never reaches the post service.

use actix_multipart::{Field, Multipart};
use actix_web::dev::Payload;
use actix_web::http::header::CONTENT_LENGTH;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use futures::StreamExt;
use log::{debug, warn};

use crate::error::AppError;

/// Name of the single file field accepted on post creation.
pub const IMAGE_FIELD: &str = "image";

/// 5 MB ceiling for the image itself.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Slack for boundaries, headers and the text fields when checking Content-Length.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// A validated image, held entirely in memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: mime::Mime,
    pub bytes: Bytes,
}

/// Multipart body of `POST /api/posts`.
#[derive(Debug, Default)]
pub struct PostForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<ImageUpload>,
}

pub fn is_image(content_type: Option<&mime::Mime>) -> bool {
    content_type.is_some_and(|m| m.type_() == mime::IMAGE)
}

/// Rejects requests whose declared size cannot possibly fit under the limit.
fn check_declared_length(req: &HttpRequest) -> Result<(), AppError> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    match declared {
        Some(len) if len > MAX_IMAGE_BYTES + FORM_OVERHEAD_BYTES => {
            warn!("rejecting upload with content-length {}", len);
            Err(AppError::Validation("File too large".into()))
        }
        _ => Ok(()),
    }
}

async fn read_limited(field: &mut Field, limit: usize, too_large: &str) -> Result<Bytes, AppError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?;
        if buf.len() + chunk.len() > limit {
            return Err(AppError::Validation(too_large.to_string()));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, AppError> {
    let raw = read_limited(field, MAX_TEXT_FIELD_BYTES, "Field too large").await?;
    String::from_utf8(raw.to_vec())
        .map_err(|_| AppError::Validation(format!("Field '{}' must be valid UTF-8", name)))
}

async fn drain(field: &mut Field) -> Result<(), AppError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?;
    }
    Ok(())
}

/// Walks the multipart stream, validating the image field as it arrives.
pub async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next().await {
        let mut field = field.map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?;
        let name = field.content_disposition().get_name().unwrap_or_default().to_string();

        match name.as_str() {
            IMAGE_FIELD => {
                if form.image.is_some() {
                    return Err(AppError::Validation("Only one image may be attached".into()));
                }
                let content_type = match field.content_type() {
                    Some(m) if is_image(Some(m)) => m.clone(),
                    other => {
                        warn!("rejected upload with content type {:?}", other.map(|m| m.to_string()));
                        return Err(AppError::Validation("Only image files are allowed".into()));
                    }
                };
                let file_name = field.content_disposition().get_filename().map(str::to_string);
                let bytes = read_limited(&mut field, MAX_IMAGE_BYTES, "File too large").await?;
                if bytes.is_empty() {
                    return Err(AppError::Validation("Uploaded image is empty".into()));
                }
                debug!("buffered image {:?} ({} bytes, {})", file_name, bytes.len(), content_type);
                form.image = Some(ImageUpload { file_name, content_type, bytes });
            }
            "title" => form.title = Some(read_text(&mut field, "title").await?),
            "content" => form.content = Some(read_text(&mut field, "content").await?),
            _ => drain(&mut field).await?,
        }
    }

    Ok(form)
}

impl FromRequest for PostForm {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if let Err(e) = check_declared_length(req) {
            return Box::pin(async move { Err(e) });
        }
        let multipart = Multipart::new(req.headers(), payload.take());
        Box::pin(read_post_form(multipart))
    }
}
