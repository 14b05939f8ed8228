// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use postboard_be::config::{self, AppConfig, StoreKind};
use postboard_be::repositories::post_memory_repo::MemoryPostRepository;
use postboard_be::repositories::post_pg_repo::PgPostRepository;
use postboard_be::repositories::post_repository::PostRepository;
use postboard_be::services::auth_services::TokenVerifier;
use postboard_be::services::image_storage::{DiskImageStorage, ImageStorage, MemoryImageStorage};
use postboard_be::services::post_services::PostService;

fn mask_key(k: &str) -> String {
    match (k.get(..4), k.get(k.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if k.len() > 8 => format!("{}***{}", head, tail),
        _ => "[REDACTED]".to_string(),
    }
}

async fn build_post_service(cfg: &AppConfig) -> anyhow::Result<PostService> {
    let (repo, images): (Arc<dyn PostRepository>, Arc<dyn ImageStorage>) = match cfg.store {
        StoreKind::Postgres => {
            let repo = PgPostRepository::new(config::get_pg_pool()?);
            repo.ensure_schema().await?;
            let images = DiskImageStorage::new(&cfg.upload_dir).await?;
            (Arc::new(repo), Arc::new(images))
        }
        StoreKind::Memory => {
            info!("using in-memory post store, data is lost on restart");
            (Arc::new(MemoryPostRepository::new()), Arc::new(MemoryImageStorage::new()))
        }
    };
    Ok(PostService::new(repo, images))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("JWT secret: {}", mask_key(&cfg.jwt_secret));
    info!("Post store: {:?}", cfg.store);

    let post_service = match build_post_service(&cfg).await {
        Ok(svc) => svc,
        Err(e) => {
            error!("failed to initialise post store: {:#}", e);
            std::process::exit(1);
        }
    };

    let post_data = web::Data::new(post_service);
    let verifier_data = web::Data::new(TokenVerifier::new(&cfg.jwt_secret));
    let allowed_origins = cfg.allowed_origins.clone();

    let bind_address = cfg.bind_address();
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept", "x-requested-with"])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(post_data.clone())
            .app_data(verifier_data.clone())
            .configure(postboard_be::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
