//! Product image storage on the local filesystem.
//!
//! Stored names are `{uuid}_{original}`, where the original is reduced to
//! its final path component and a safe character set. Images are served
//! back under `/img/`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Accepted image extensions, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Maximum stored file name length, matching the `product.image` column.
const MAX_STORED_NAME: usize = 300;

/// Errors that can occur while storing an image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("The uploaded file is empty.")]
    Empty,

    #[error("Only {} images are accepted.", ALLOWED_EXTENSIONS.join(", "))]
    UnsupportedType,

    #[error("A file with this name already exists!")]
    AlreadyExists,

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether the error is the user's to fix (shown next to the form field).
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Directory-backed image store.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store an uploaded image and return its stored file name.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Empty` for a zero-byte upload,
    /// `UploadError::UnsupportedType` for a non-image extension and
    /// `UploadError::AlreadyExists` if the target file is already present.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let name = sanitize_file_name(original_name);
        if !has_allowed_extension(&name) {
            return Err(UploadError::UnsupportedType);
        }

        let stored = truncate_name(format!("{}_{name}", Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(&stored);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    UploadError::AlreadyExists
                } else {
                    UploadError::Io(e)
                }
            })?;

        if let Err(e) = write_all(&mut file, bytes).await {
            drop(file);
            remove_partial(&path).await;
            return Err(e.into());
        }

        tracing::info!(file = %stored, size = bytes.len(), "Stored product image");
        Ok(stored)
    }

    /// Remove a stored image. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the file exists but cannot be removed.
    pub async fn remove(&self, stored_name: &str) -> Result<(), UploadError> {
        let name = sanitize_file_name(stored_name);
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

/// Reduce a client-provided file name to a safe final path component.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = last
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_owned()
    } else {
        cleaned.to_owned()
    }
}

fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Keep the extension when a long name must be cut.
fn truncate_name(name: String) -> String {
    if name.len() <= MAX_STORED_NAME {
        return name;
    }
    let ext = Path::new(&name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let keep = MAX_STORED_NAME - ext.len();
    // ASCII only after sanitizing, so byte slicing is safe.
    format!("{}{ext}", &name[..keep])
}

/// Best-effort removal of a partially written image.
async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial image");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> ImageStore {
        ImageStore::new(std::env::temp_dir().join(format!("catalog-uploads-{}", Uuid::new_v4())))
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd.png"), "passwd.png");
        assert_eq!(sanitize_file_name(r"C:\Users\ana\photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_file_name("café.png"), "caf_.png");
        assert_eq!(sanitize_file_name(""), "image");
    }

    #[test]
    fn test_allowed_extensions() {
        assert!(has_allowed_extension("a.PNG"));
        assert!(has_allowed_extension("a.jpeg"));
        assert!(!has_allowed_extension("a.svg"));
        assert!(!has_allowed_extension("png"));
    }

    #[test]
    fn test_truncate_keeps_extension() {
        let long = format!("{}.png", "a".repeat(400));
        let cut = truncate_name(long);
        assert_eq!(cut.len(), MAX_STORED_NAME);
        assert!(cut.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_remove_partial() {
        let store = temp_store();
        tokio::fs::create_dir_all(store.dir()).await.unwrap();
        let path = store.dir().join("partial.png");
        tokio::fs::write(&path, b"\x89P").await.unwrap();

        remove_partial(&path).await;
        assert!(!path.exists());

        // A second attempt only logs.
        remove_partial(&path).await;
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let store = temp_store();
        let name = store.save("photo.png", b"\x89PNG").await.unwrap();
        assert!(name.ends_with("_photo.png"));

        let path = store.dir().join(&name);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\x89PNG");

        store.remove(&name).await.unwrap();
        assert!(!path.exists());
        // Removing again is fine.
        store.remove(&name).await.unwrap();

        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }

    #[tokio::test]
    async fn test_save_rejects_empty_and_unsupported() {
        let store = temp_store();
        assert!(matches!(
            store.save("photo.png", b"").await,
            Err(UploadError::Empty)
        ));
        assert!(matches!(
            store.save("script.sh", b"#!/bin/sh").await,
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn test_already_exists_message() {
        assert_eq!(
            UploadError::AlreadyExists.to_string(),
            "A file with this name already exists!"
        );
        assert!(UploadError::AlreadyExists.is_user_error());
        assert!(!UploadError::Io(std::io::Error::other("disk")).is_user_error());
    }
}
