pub mod auth_extractor;
pub mod upload_guard;
