//! Upload, retrieval, and listing routes for stored images.

use std::time::Instant;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use super::error::AppError;
use super::extract::collect_images;
use super::AppContext;
use crate::store;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub time_elapsed: f64,
}

#[derive(Debug, Serialize)]
pub struct ListImagesResponse {
    pub images: Vec<String>,
}

/// POST /upload
///
/// Persists every file from the `images` field and reports how long the
/// round trip took. Existing files with the same name are overwritten.
pub async fn upload(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let started = Instant::now();

    let files = collect_images(&mut multipart).await?;
    for file in &files {
        ctx.store.put(&file.filename, &file.bytes)?;
    }

    let time_elapsed = started.elapsed().as_secs_f64();
    metrics::counter!("pixelforge_uploads_total").increment(files.len() as u64);
    tracing::info!(count = files.len(), time_elapsed, "Stored uploaded images");

    Ok(Json(UploadResponse {
        message: "Upload successful".to_string(),
        time_elapsed,
    }))
}

/// GET /image/{filename}
///
/// Returns the stored bytes verbatim with a content type guessed from the
/// file extension.
pub async fn get_image(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = ctx.store.read(&filename)?;
    let content_type = store::content_type_for(&filename);
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes))
}

/// GET /images
pub async fn list_images(
    State(ctx): State<AppContext>,
) -> Result<Json<ListImagesResponse>, AppError> {
    let images = ctx.store.list()?;
    Ok(Json(ListImagesResponse { images }))
}
