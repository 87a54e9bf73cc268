//! Local filesystem image store.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use gazette_core::ports::{ImageFormat, ImageStore, StorageError};

/// Writes uploaded images into a directory that the HTTP layer serves
/// statically. Stored names are generated server-side, so a client-supplied
/// filename never touches the filesystem.
pub struct LocalImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, format: ImageFormat, bytes: Vec<u8>) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let filename = format!("{}.{}", Uuid::new_v4(), format.extension());
        let path = self.root.join(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(file = %path.display(), "Stored uploaded image");

        Ok(format!("{}/{}", self.public_prefix, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_bytes_under_public_path() {
        let root = std::env::temp_dir().join(format!("gazette-store-{}", Uuid::new_v4()));
        let store = LocalImageStore::new(&root, "/uploads");

        let path = store
            .store(ImageFormat::Png, vec![0x89, 0x50, 0x4e, 0x47])
            .await
            .unwrap();

        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));

        let on_disk = root.join(path.trim_start_matches("/uploads/"));
        let bytes = tokio::fs::read(&on_disk).await.unwrap();
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
