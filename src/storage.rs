//! Media storage for uploaded blobs (videos, thumbnails, avatars).
//!
//! Two backends selected at startup: GCS when credentials are configured,
//! or a local directory for development (LOCAL_STORAGE_PATH). Uploads go
//! through a temp-file staging step so a failed push never leaves partial
//! objects, and the staged file is removed best-effort afterwards.

use bytes::Bytes;
use chrono::Utc;
use std::path::PathBuf;

type StorageError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct MediaStorage {
    gcs: Option<google_cloud_storage::client::Storage>,
    local_storage_path: Option<PathBuf>,
    bucket_name: String,
    /// Base URL that serves objects uploaded to the local backend
    public_base_url: String,
}

/// Map an upload's content type to a file extension
pub fn get_extension(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        _ => "bin",
    }
}

/// Build an object path like `videos/user_12/2026-08-25/1756100000000.mp4`.
/// `user_key` is `user_{id}` for authenticated uploads, or the username at
/// registration time when no id exists yet.
pub fn build_object_path(kind: &str, user_key: &str, ext: &str) -> String {
    let now = Utc::now();
    format!(
        "{}/{}/{}/{}.{}",
        kind,
        user_key,
        now.format("%Y-%m-%d"),
        now.timestamp_millis(),
        ext
    )
}

impl MediaStorage {
    pub fn new(
        gcs: Option<google_cloud_storage::client::Storage>,
        local_storage_path: Option<PathBuf>,
        bucket_name: &str,
        public_base_url: &str,
    ) -> Self {
        Self {
            gcs,
            local_storage_path,
            bucket_name: bucket_name.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL for an object previously uploaded at `path`
    pub fn public_url(&self, path: &str) -> String {
        if self.local_storage_path.is_some() {
            format!("{}/{}", self.public_base_url, path)
        } else {
            format!("https://storage.googleapis.com/{}/{}", self.bucket_name, path)
        }
    }

    /// Upload data under `path` and return its public URL.
    pub async fn upload(&self, path: &str, data: &[u8]) -> Result<String, StorageError> {
        if let Some(local_path) = &self.local_storage_path {
            let full_path = local_path.join(path);
            if let Some(parent) = full_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&full_path, data).await?;
        } else if let Some(gcs) = &self.gcs {
            let bucket = format!("projects/_/buckets/{}", self.bucket_name);
            let bytes = Bytes::copy_from_slice(data);
            gcs.write_object(&bucket, path, bytes)
                .send_buffered()
                .await?;
        } else {
            return Err(
                "No storage backend configured (set LOCAL_STORAGE_PATH or GOOGLE_APPLICATION_CREDENTIALS)"
                    .into(),
            );
        }
        Ok(self.public_url(path))
    }

    /// Stage upload bytes to a temp file, push to storage, clean up the
    /// staged file. Cleanup failures are logged, not surfaced.
    pub async fn stage_and_upload(&self, path: &str, data: &[u8]) -> Result<String, StorageError> {
        let staged = std::env::temp_dir().join(format!(
            "videotube_upload_{}_{}",
            Utc::now().timestamp_millis(),
            path.replace('/', "_")
        ));
        tokio::fs::write(&staged, data).await?;

        let result = async {
            let contents = tokio::fs::read(&staged).await?;
            self.upload(path, &contents).await
        }
        .await;

        if let Err(e) = tokio::fs::remove_file(&staged).await {
            eprintln!("Failed to remove staged upload {}: {}", staged.display(), e);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(get_extension("video/mp4"), "mp4");
        assert_eq!(get_extension("image/jpeg"), "jpg");
        assert_eq!(get_extension("application/octet-stream"), "bin");
    }

    #[test]
    fn test_object_path_shape() {
        let path = build_object_path("videos", "user_12", "mp4");
        assert!(path.starts_with("videos/user_12/"));
        assert!(path.ends_with(".mp4"));
    }

    #[test]
    fn test_local_public_url() {
        let storage = MediaStorage::new(
            None,
            Some(PathBuf::from("/tmp/media")),
            "videotube_media_data",
            "http://localhost:8000/media/",
        );
        assert_eq!(
            storage.public_url("videos/user_1/x.mp4"),
            "http://localhost:8000/media/videos/user_1/x.mp4"
        );
    }

    #[test]
    fn test_gcs_public_url() {
        let storage = MediaStorage::new(None, None, "videotube_media_data", "");
        assert_eq!(
            storage.public_url("videos/user_1/x.mp4"),
            "https://storage.googleapis.com/videotube_media_data/videos/user_1/x.mp4"
        );
    }

    #[tokio::test]
    async fn test_local_upload_roundtrip() {
        let dir = std::env::temp_dir().join("videotube_storage_test");
        let storage = MediaStorage::new(
            None,
            Some(dir.clone()),
            "videotube_media_data",
            "http://localhost:8000/media",
        );
        let url = storage
            .stage_and_upload("thumbnails/user_1/t.jpg", b"fake-jpeg")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8000/media/thumbnails/user_1/t.jpg");
        let written = tokio::fs::read(dir.join("thumbnails/user_1/t.jpg"))
            .await
            .unwrap();
        assert_eq!(written, b"fake-jpeg");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
