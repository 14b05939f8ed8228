pub mod post_memory_repo;
pub mod post_pg_repo;
pub mod post_repository;
