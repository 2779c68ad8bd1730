//! Transform routes covering single stored images and uploaded batches.
//!
//! Single-image routes read from the store and return one PNG. Batch routes
//! accept a multipart upload, transform every file, and answer with a zip
//! archive without touching the store.

use std::collections::HashSet;
use std::time::Instant;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::IntoResponse;

use super::error::AppError;
use super::extract::collect_images;
use super::AppContext;
use crate::archive::{unique_entry_name, ZipBuilder};
use crate::error::Error;
use crate::transform::{self, TransformKind};

const TIME_ELAPSED: HeaderName = HeaderName::from_static("x-time-elapsed");

/// GET /upscale/{filename}
pub async fn upscale_stored(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    transform_stored(ctx, filename, TransformKind::Upscale).await
}

/// GET /downscale/{filename}
pub async fn downscale_stored(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    transform_stored(ctx, filename, TransformKind::Downscale).await
}

/// GET /invert/{filename}
pub async fn invert_stored(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    transform_stored(ctx, filename, TransformKind::Invert).await
}

/// POST /upscale
pub async fn upscale_batch(multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    transform_batch(multipart, TransformKind::Upscale).await
}

/// POST /downscale
pub async fn downscale_batch(multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    transform_batch(multipart, TransformKind::Downscale).await
}

/// POST /invert
pub async fn invert_batch(multipart: Multipart) -> Result<impl IntoResponse, AppError> {
    transform_batch(multipart, TransformKind::Invert).await
}

async fn transform_stored(
    ctx: AppContext,
    filename: String,
    kind: TransformKind,
) -> Result<impl IntoResponse, AppError> {
    let bytes = ctx.store.read(&filename)?;
    let png = transform::run(kind, &filename, &bytes)?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], png))
}

/// Transforms every uploaded file and packs the results into one archive.
/// The first file that fails to decode or transform aborts the whole batch.
async fn transform_batch(
    mut multipart: Multipart,
    kind: TransformKind,
) -> Result<impl IntoResponse, AppError> {
    let started = Instant::now();

    let files = collect_images(&mut multipart).await?;
    if files.is_empty() {
        return Err(Error::Validation("No images uploaded".into()).into());
    }

    let mut builder = ZipBuilder::new();
    let mut used = HashSet::new();
    for file in &files {
        let png = transform::run(kind, &file.filename, &file.bytes)?;
        let entry = unique_entry_name(
            format!("{}{}", kind.entry_prefix(), file.filename),
            &mut used,
        );
        builder.add(&entry, &png)?;
    }
    let archive = builder.finish()?;

    let elapsed = started.elapsed().as_secs_f64();
    metrics::counter!("pixelforge_batch_requests_total", "kind" => kind.name()).increment(1);
    tracing::info!(
        kind = kind.name(),
        count = files.len(),
        bytes = archive.len(),
        elapsed,
        "Packed batch archive"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.archive_name()),
        ),
        (TIME_ELAPSED, format!("{elapsed:.6}")),
    ];
    Ok((StatusCode::OK, headers, archive))
}
