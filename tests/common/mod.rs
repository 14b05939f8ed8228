#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use postboard_be::models::user::JwtClaims;
use postboard_be::repositories::post_memory_repo::MemoryPostRepository;
use postboard_be::services::auth_services::TokenVerifier;
use postboard_be::services::image_storage::MemoryImageStorage;
use postboard_be::services::post_services::PostService;

pub const SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "----postboard-test-boundary";

pub struct TestState {
    pub posts: web::Data<PostService>,
    pub verifier: web::Data<TokenVerifier>,
}

pub fn state() -> TestState {
    let svc = PostService::new(
        Arc::new(MemoryPostRepository::new()),
        Arc::new(MemoryImageStorage::new()),
    );
    TestState {
        posts: web::Data::new(svc),
        verifier: web::Data::new(TokenVerifier::new(SECRET)),
    }
}

pub fn token_for(user_id: Uuid, username: &str) -> String {
    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
        iat: Some(chrono::Utc::now().timestamp() as u64),
        username: Some(username.to_string()),
        email: Some(format!("{}@example.com", username)),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .expect("encode token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Hand-built multipart body: text fields, then an optional (name, content type, bytes) file.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
