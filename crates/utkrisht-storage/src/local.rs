use crate::traits::{
    MediaStore, ResourcePage, StorageError, StorageResult, UploadDescriptor, UploadSignature,
    LIST_PAGE_SIZE,
};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem media store
///
/// Objects are written to `{base_path}/{public_id}`; public ids carry the
/// folder path plus a generated file name with an extension sniffed from the
/// payload. Listing cursors are plain offsets into the sorted key list.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

/// Recognise a handful of common image formats from their magic bytes.
fn sniff_format(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if data.starts_with(b"GIF8") {
        Some("gif")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/utkrisht/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a public id or folder to a filesystem path, rejecting traversal
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// All stored keys below the directory that `prefix` names, sorted
    async fn collect_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let root = self.key_to_path(prefix.trim_end_matches('/'))?;
        let mut keys = Vec::new();
        let mut pending = vec![root];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.base_path) {
                    keys.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl MediaStore for LocalStorage {
    async fn upload(&self, data: Vec<u8>, folder: &str) -> StorageResult<UploadDescriptor> {
        let format = sniff_format(&data);
        let file_name = match format {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let key = format!("{}/{}", folder.trim_matches('/'), file_name);
        let path = self.key_to_path(&key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::BackendError(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::BackendError(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::BackendError(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            public_id = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(UploadDescriptor {
            public_id: key,
            url,
            width: None,
            height: None,
            format: format.map(String::from),
            bytes: size as i64,
            resource_type: "image".to_string(),
            folder: folder.to_string(),
        })
    }

    async fn destroy(&self, public_id: &str) -> StorageResult<()> {
        let path = self.key_to_path(public_id)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::BackendError(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            public_id = %public_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn list_by_prefix(
        &self,
        prefix: &str,
        cursor: Option<&str>,
    ) -> StorageResult<ResourcePage> {
        let keys = self.collect_keys(prefix).await?;
        let offset = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| StorageError::InvalidKey(format!("Invalid cursor: {}", c)))?,
            None => 0,
        };

        let end = (offset + LIST_PAGE_SIZE).min(keys.len());
        let public_ids = keys.get(offset..end).map(<[String]>::to_vec).unwrap_or_default();
        let next_cursor = (end < keys.len()).then(|| end.to_string());

        Ok(ResourcePage {
            public_ids,
            next_cursor,
        })
    }

    async fn batch_delete(&self, public_ids: &[String]) -> StorageResult<()> {
        for public_id in public_ids {
            self.destroy(public_id).await?;
        }
        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> StorageResult<()> {
        let dir = self.key_to_path(path.trim_end_matches('/'))?;
        match fs::remove_dir(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::BackendError(format!(
                "Failed to delete folder {}: {}",
                dir.display(),
                e
            ))),
        }
    }

    async fn ping(&self) -> StorageResult<()> {
        let meta = fs::metadata(&self.base_path).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(StorageError::ConfigError(format!(
                "{} is not a directory",
                self.base_path.display()
            )))
        }
    }

    fn sign_upload_params(
        &self,
        _params: &BTreeMap<String, String>,
    ) -> StorageResult<UploadSignature> {
        Err(StorageError::ConfigError(
            "Direct upload signing is not supported by the local backend".to_string(),
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000/media".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_upload_and_destroy() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let descriptor = storage
            .upload(PNG_HEADER.to_vec(), "utkrisht/hero")
            .await
            .unwrap();

        assert!(descriptor.public_id.starts_with("utkrisht/hero/"));
        assert!(descriptor.public_id.ends_with(".png"));
        assert_eq!(descriptor.format.as_deref(), Some("png"));
        assert_eq!(descriptor.bytes, 8);
        assert!(descriptor
            .url
            .starts_with("http://localhost:3000/media/utkrisht/hero/"));
        assert!(dir.path().join(&descriptor.public_id).exists());

        storage.destroy(&descriptor.public_id).await.unwrap();
        assert!(!dir.path().join(&descriptor.public_id).exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.destroy("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.upload(vec![1], "../outside").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.list_by_prefix("/etc", None).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_destroy_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        assert!(storage.destroy("utkrisht/gallery/missing.png").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_batch_delete_and_remove_folder() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        for _ in 0..3 {
            storage
                .upload(PNG_HEADER.to_vec(), "utkrisht/projects/p1")
                .await
                .unwrap();
        }
        storage
            .upload(PNG_HEADER.to_vec(), "utkrisht/projects/p2")
            .await
            .unwrap();

        let page = storage
            .list_by_prefix("utkrisht/projects/p1", None)
            .await
            .unwrap();
        assert_eq!(page.public_ids.len(), 3);
        assert!(page.next_cursor.is_none());

        storage.batch_delete(&page.public_ids).await.unwrap();
        storage.delete_folder("utkrisht/projects/p1").await.unwrap();

        assert!(!dir.path().join("utkrisht/projects/p1").exists());
        assert!(dir.path().join("utkrisht/projects/p2").exists());
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let page = storage.list_by_prefix("utkrisht/none", None).await.unwrap();
        assert_eq!(page, ResourcePage::default());
    }

    #[tokio::test]
    async fn test_signing_unsupported() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        assert!(matches!(
            storage.sign_upload_params(&BTreeMap::new()),
            Err(StorageError::ConfigError(_))
        ));
        assert!(storage.ping().await.is_ok());
    }
}
