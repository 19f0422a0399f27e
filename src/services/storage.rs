use crate::utils::validation::image_extension;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::path::PathBuf;
use uuid::Uuid;

/// A file received in a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    /// Extension for the stored copy, derived from the file's magic bytes.
    pub fn extension(&self) -> Result<&'static str> {
        image_extension(&self.data, self.content_type.as_deref())
    }

    fn stored_name(&self) -> Result<String> {
        Ok(format!("{}.{}", Uuid::new_v4(), self.extension()?))
    }
}

/// Storage for posters and actor pictures. Paths returned by `save_file`
/// are public URLs and are what gets persisted on the entity.
#[async_trait]
pub trait FileStorageService: Send + Sync {
    async fn save_file(&self, container: &str, file: &UploadedFile) -> Result<String>;

    async fn delete_file(&self, file_route: Option<&str>, container: &str) -> Result<()>;

    /// Replaces `file_route` with `file`. The old file is removed only after
    /// the new one is stored.
    async fn edit_file(
        &self,
        container: &str,
        file: &UploadedFile,
        file_route: Option<&str>,
    ) -> Result<String> {
        let route = self.save_file(container, file).await?;
        self.delete_file(file_route, container).await?;
        Ok(route)
    }
}

/// Last path segment of a stored route, ignoring empty routes.
fn file_name_of(file_route: Option<&str>) -> Option<&str> {
    file_route
        .filter(|route| !route.trim().is_empty())
        .and_then(|route| route.rsplit('/').next())
        .filter(|name| !name.is_empty() && *name != "..")
}

pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FileStorageService for LocalFileStorage {
    async fn save_file(&self, container: &str, file: &UploadedFile) -> Result<String> {
        let name = file.stored_name()?;
        let folder = self.root.join(container);

        tokio::fs::create_dir_all(&folder)
            .await
            .with_context(|| format!("creating {}", folder.display()))?;
        tokio::fs::write(folder.join(&name), &file.data)
            .await
            .with_context(|| format!("writing {}/{}", container, name))?;

        Ok(format!("{}/{}/{}", self.public_base_url, container, name))
    }

    async fn delete_file(&self, file_route: Option<&str>, container: &str) -> Result<()> {
        let Some(name) = file_name_of(file_route) else {
            return Ok(());
        };

        let path = self.root.join(container).join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("File already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("deleting {}", path.display())),
        }
    }
}

pub struct S3FileStorage {
    client: Client,
    bucket: String,
    public_url: String,
}

impl S3FileStorage {
    pub fn new(client: Client, bucket: String, public_url: &str) -> Self {
        Self {
            client,
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FileStorageService for S3FileStorage {
    async fn save_file(&self, container: &str, file: &UploadedFile) -> Result<String> {
        let key = format!("{}/{}", container, file.stored_name()?);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.data.clone()));
        if let Some(content_type) = &file.content_type {
            request = request.content_type(content_type);
        }

        if let Err(e) = request.send().await {
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, error={:?}",
                self.bucket,
                key,
                e
            );
            return Err(e.into());
        }

        Ok(format!("{}/{}", self.public_url, key))
    }

    async fn delete_file(&self, file_route: Option<&str>, container: &str) -> Result<()> {
        let Some(name) = file_name_of(file_route) else {
            return Ok(());
        };

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(format!("{}/{}", container, name))
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn png() -> UploadedFile {
        UploadedFile {
            file_name: Some("poster.png".to_string()),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(PNG_BYTES),
        }
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(
            file_name_of(Some("http://host/uploads/movies/a.png")),
            Some("a.png")
        );
        assert_eq!(file_name_of(Some("")), None);
        assert_eq!(file_name_of(None), None);
        assert_eq!(file_name_of(Some("http://host/uploads/movies/")), None);
    }

    #[tokio::test]
    async fn test_local_save_edit_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "http://localhost:3000/uploads/");

        let route = storage.save_file("movies", &png()).await.unwrap();
        assert!(route.starts_with("http://localhost:3000/uploads/movies/"));
        assert!(route.ends_with(".png"));

        let first = dir.path().join("movies").join(file_name_of(Some(&route)).unwrap());
        assert!(first.exists());

        let replaced = storage
            .edit_file("movies", &png(), Some(&route))
            .await
            .unwrap();
        assert_ne!(replaced, route);
        assert!(!first.exists());

        storage.delete_file(Some(&replaced), "movies").await.unwrap();
        let second = dir
            .path()
            .join("movies")
            .join(file_name_of(Some(&replaced)).unwrap());
        assert!(!second.exists());

        // Deleting twice or deleting nothing is fine
        storage.delete_file(Some(&replaced), "movies").await.unwrap();
        storage.delete_file(None, "movies").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "/uploads");
        let file = UploadedFile {
            file_name: Some("notes.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            data: Bytes::from_static(b"hello"),
        };
        assert!(storage.save_file("movies", &file).await.is_err());
    }
}
