pub mod auth_services;
pub mod image_storage;
pub mod post_services;
