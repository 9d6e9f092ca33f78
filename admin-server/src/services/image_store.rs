//! Uploaded image storage
//!
//! Product and user pictures arrive as multipart fields, are re-encoded as
//! JPEG and stored under `{work_dir}/uploads/{sha256}.jpg`. The hash name makes
//! repeated uploads of the same picture land on the same file.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::utils::{AppError, AppResult};

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality (85% keeps product photos appetizing at a reasonable size)
const JPEG_QUALITY: u8 = 85;

/// Public URL prefix the files are served under
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Validate, re-encode and store an image; returns its public URL
    pub async fn save(&self, original_name: Option<&str>, data: Vec<u8>) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::validation("Empty file provided"));
        }
        if let Some(ext) = original_name.and_then(extension_of) {
            check_format(&ext)?;
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::validation(format!(
                "File too large. Maximum size is {}MB",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        // decoding is CPU bound
        let compressed = tokio::task::spawn_blocking(move || compress_to_jpeg(&data))
            .await
            .map_err(|e| AppError::internal(format!("Image task failed: {e}")))??;

        let hash = hex::encode(Sha256::digest(&compressed));
        let filename = format!("{hash}.jpg");
        let file_path = self.dir.join(&filename);

        if tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
            tracing::debug!(hash = %hash, "Image already stored");
            return Ok(format!("{PUBLIC_PREFIX}/{filename}"));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create uploads directory: {e}")))?;

        // tmp file + rename so a crash never leaves a truncated image
        let tmp_path = self.dir.join(format!("{filename}.tmp"));
        tokio::fs::write(&tmp_path, &compressed)
            .await
            .map_err(|e| AppError::internal(format!("Failed to save file: {e}")))?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &file_path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::internal(format!("Failed to save file: {e}")));
        }

        tracing::info!(
            original_name = original_name.unwrap_or("-"),
            size = compressed.len(),
            hash = %hash,
            "Image uploaded"
        );
        Ok(format!("{PUBLIC_PREFIX}/{filename}"))
    }

    /// Read a stored file; `None` when it does not exist
    pub async fn read(&self, filename: &str) -> AppResult<Option<Vec<u8>>> {
        if !is_safe_filename(filename) {
            return Err(AppError::validation("Invalid filename"));
        }
        match tokio::fs::read(self.dir.join(filename)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::internal(format!("Failed to read {filename}: {e}"))),
        }
    }
}

/// Rejects anything that could leave the uploads directory
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn check_format(ext: &str) -> AppResult<()> {
    if SUPPORTED_FORMATS.contains(&ext) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext,
            SUPPORTED_FORMATS.join(", ")
        )))
    }
}

fn compress_to_jpeg(data: &[u8]) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image: {}", e)))?;

    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::internal(format!("Failed to compress image: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 40]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_save_and_read() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().join("uploads"));

        let url = store.save(Some("cake.PNG"), png_bytes()).await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".jpg"));

        // same picture, same file
        let again = store.save(Some("copy.png"), png_bytes()).await.unwrap();
        assert_eq!(url, again);

        let filename = url.trim_start_matches("/uploads/");
        let content = store.read(filename).await.unwrap().unwrap();
        assert!(!content.is_empty());
        assert!(store.read("missing.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path());

        assert!(store.save(Some("a.png"), vec![]).await.is_err());
        assert!(store.save(Some("a.gif"), png_bytes()).await.is_err());
        assert!(store.save(Some("a.png"), b"not an image".to_vec()).await.is_err());
        assert!(store.read("../secret").await.is_err());
    }

    #[test]
    fn test_safe_filename() {
        assert!(is_safe_filename("abc.jpg"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("a/b.jpg"));
        assert!(!is_safe_filename("..\\x"));
    }
}
