//! Multipart form handling shared by the upload endpoints
//! (registration, avatar/cover updates, video publishing)

use axum::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;

use crate::services::error::ApiError;

/// A file part pulled out of a multipart form
pub struct UploadedFile {
    pub content_type: String,
    pub data: Bytes,
}

/// Split a multipart form into named text fields and named file parts.
/// A part counts as a file when the client sent a filename.
pub async fn collect_fields(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, HashMap<String, UploadedFile>), ApiError> {
    let mut texts = HashMap::new();
    let mut files = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = match field.name() {
            Some(n) => n.to_string(),
            None => continue,
        };

        if field.file_name().is_some() {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            files.insert(name, UploadedFile { content_type, data });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read field: {}", e)))?;
            texts.insert(name, value);
        }
    }

    Ok((texts, files))
}

/// Fetch a required, non-blank text field
pub fn require_text<'a>(
    texts: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, ApiError> {
    texts
        .get(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))
}
