//! Multipart ingestion shared by the upload and batch transform handlers.

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::{Error, Result};

/// One file pulled out of a multipart `images` field.
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Bytes,
}

/// Collect every file submitted under the `images` multipart field.
///
/// Entries with an empty filename are skipped silently, matching the upload
/// contract. Fails with a validation error when the request carries no
/// `images` field at all; the returned list may still be empty when every
/// entry was skipped.
pub async fn collect_images(multipart: &mut Multipart) -> Result<Vec<UploadedImage>> {
    let mut saw_field = false;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Malformed multipart request: {e}")))?
    {
        if field.name() != Some("images") {
            continue;
        }
        saw_field = true;

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Failed to read uploaded file: {e}")))?;

        if filename.is_empty() {
            continue;
        }

        files.push(UploadedImage { filename, bytes });
    }

    if !saw_field {
        return Err(Error::Validation("No images part in request".into()));
    }

    Ok(files)
}
