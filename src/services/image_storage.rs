// src/services/image_storage.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::middleware::upload_guard::ImageUpload;

/// Public prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/api/uploads/posts";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid file name")]
    InvalidName,
}

/// Where validated uploads end up once the handler accepts them.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Stores the image and returns the public URL it is served from.
    async fn store(&self, upload: &ImageUpload) -> Result<String, StorageError>;

    /// Reads a stored image back. `None` when there is no such file.
    async fn load(&self, file_name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn remove(&self, file_name: &str) -> Result<(), StorageError>;
}

/// Extension for a stored file, derived from the validated MIME subtype.
pub fn extension_for(content_type: &mime::Mime) -> &'static str {
    match content_type.subtype().as_str() {
        "jpeg" | "jpg" | "pjpeg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "webp" => "webp",
        "svg" => "svg",
        "bmp" => "bmp",
        "avif" => "avif",
        _ => "img",
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Raster formats that are safe to display inline.
pub fn is_inline_safe(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/bmp" | "image/avif"
    )
}

/// File name part of a URL produced by [`ImageStorage::store`].
pub fn file_name_from_url(url: &str) -> Option<&str> {
    url.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')
}

/// Rejects anything that is not a bare file name, so lookups cannot leave the upload dir.
fn sanitize(file_name: &str) -> Result<&str, StorageError> {
    let bare = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(StorageError::InvalidName)?;
    if bare != file_name || bare.starts_with('.') {
        return Err(StorageError::InvalidName);
    }
    Ok(bare)
}

fn generated_name(upload: &ImageUpload) -> String {
    format!("{}.{}", Uuid::new_v4(), extension_for(&upload.content_type))
}

pub struct DiskImageStorage {
    dir: PathBuf,
}

impl DiskImageStorage {
    /// Creates the directory if it doesn't exist.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!("storing post images in {}", dir.display());
        Ok(Self { dir })
    }
}

#[async_trait]
impl ImageStorage for DiskImageStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<String, StorageError> {
        let name = generated_name(upload);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &upload.bytes).await?;
        debug!("saved {} bytes to {}", upload.bytes.len(), path.display());
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    async fn load(&self, file_name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let name = match sanitize(file_name) {
            Ok(name) => name,
            Err(_) => return Ok(None),
        };
        match tokio::fs::read(self.dir.join(name)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, file_name: &str) -> Result<(), StorageError> {
        let name = sanitize(file_name)?;
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps images in memory. For `POST_STORE=memory` and tests.
#[derive(Default)]
pub struct MemoryImageStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStorage for MemoryImageStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<String, StorageError> {
        let name = generated_name(upload);
        self.files.write().await.insert(name.clone(), upload.bytes.to_vec());
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    async fn load(&self, file_name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.files.read().await.get(file_name).cloned())
    }

    async fn remove(&self, file_name: &str) -> Result<(), StorageError> {
        self.files.write().await.remove(file_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> ImageUpload {
        ImageUpload {
            file_name: Some("cat.png".into()),
            content_type: mime::IMAGE_PNG,
            bytes: vec![0x89, b'P', b'N', b'G'].into(),
        }
    }

    #[test]
    fn sanitize_rejects_paths() {
        assert!(sanitize("../secret").is_err());
        assert!(sanitize("a/b.png").is_err());
        assert!(sanitize(".hidden").is_err());
        assert_eq!(sanitize("ok.png").unwrap(), "ok.png");
    }

    #[test]
    fn only_raster_types_render_inline() {
        assert!(is_inline_safe(content_type_for("a.png")));
        assert!(is_inline_safe(content_type_for("a.jpg")));
        assert!(!is_inline_safe(content_type_for("a.svg")));
        assert!(!is_inline_safe(content_type_for("a.img")));
    }

    #[test]
    fn url_round_trips_to_file_name() {
        assert_eq!(file_name_from_url("/api/uploads/posts/abc.png"), Some("abc.png"));
        assert_eq!(file_name_from_url("https://cdn.example/abc.png"), None);
    }

    #[test]
    fn extension_follows_mime_subtype() {
        assert_eq!(extension_for(&mime::IMAGE_JPEG), "jpg");
        assert_eq!(extension_for(&"image/webp".parse().unwrap()), "webp");
        assert_eq!(content_type_for("x.webp"), "image/webp");
    }

    #[tokio::test]
    async fn disk_storage_stores_loads_and_removes() {
        let dir = std::env::temp_dir().join(format!("postboard-test-{}", Uuid::new_v4()));
        let storage = DiskImageStorage::new(&dir).await.unwrap();

        let url = storage.store(&png()).await.unwrap();
        let name = file_name_from_url(&url).unwrap().to_string();
        assert!(name.ends_with(".png"));
        assert_eq!(storage.load(&name).await.unwrap().unwrap(), png().bytes.to_vec());

        storage.remove(&name).await.unwrap();
        assert!(storage.load(&name).await.unwrap().is_none());
        assert!(storage.load("../etc/passwd").await.unwrap().is_none());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
