pub mod post_handlers;
pub mod upload_handlers;
