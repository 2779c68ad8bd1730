//! Per-image transform operations.
//!
//! Each transform decodes an image, produces a new image, and re-encodes it
//! as PNG. Transforms never touch the store; callers hand in bytes and get
//! bytes back.

use std::io::Cursor;
use std::time::Instant;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};

/// The transform requested by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Double both dimensions with Lanczos3 resampling.
    Upscale,
    /// Halve both dimensions (floor division) with Lanczos3 resampling.
    Downscale,
    /// Force to RGB and invert every channel. Alpha is discarded, which is
    /// lossy for transparent inputs.
    Invert,
}

impl TransformKind {
    /// Short name used in logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upscale => "upscale",
            Self::Downscale => "downscale",
            Self::Invert => "invert",
        }
    }

    /// Prefix applied to each entry in a batch zip archive.
    pub fn entry_prefix(&self) -> &'static str {
        match self {
            Self::Upscale => "upscaled_",
            Self::Downscale => "downscaled_",
            Self::Invert => "inverted_",
        }
    }

    /// Download filename for a batch zip archive.
    pub fn archive_name(&self) -> &'static str {
        match self {
            Self::Upscale => "upscaled_images.zip",
            Self::Downscale => "downscaled_images.zip",
            Self::Invert => "inverted_images.zip",
        }
    }

    /// Apply this transform to a decoded image.
    ///
    /// `name` identifies the input in error messages only.
    pub fn apply(&self, img: DynamicImage, name: &str) -> Result<DynamicImage> {
        let (w, h) = (img.width(), img.height());
        match self {
            Self::Upscale => match (w.checked_mul(2), h.checked_mul(2)) {
                (Some(tw), Some(th)) => Ok(img.resize_exact(tw, th, FilterType::Lanczos3)),
                _ => Err(Error::transform(name, format!("{w}x{h} is too large to double"))),
            },
            Self::Downscale => {
                if w < 2 || h < 2 {
                    return Err(Error::transform(
                        name,
                        format!("{w}x{h} is too small to halve"),
                    ));
                }
                Ok(img.resize_exact(w / 2, h / 2, FilterType::Lanczos3))
            }
            Self::Invert => {
                let mut rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                rgb.invert();
                Ok(rgb)
            }
        }
    }
}

/// Decode raw bytes into an image, surfacing failures as a typed 422.
pub fn decode(name: &str, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::decode(name, e))
}

/// Encode an image as PNG into an in-memory buffer.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::Internal(format!("Failed to encode PNG: {e}")))?;
    Ok(buf.into_inner())
}

/// Decode `bytes`, apply `kind`, and re-encode as PNG.
///
/// Records a per-item duration histogram labelled by transform kind.
pub fn run(kind: TransformKind, name: &str, bytes: &[u8]) -> Result<Vec<u8>> {
    let started = Instant::now();

    let img = decode(name, bytes)?;
    let transformed = kind.apply(img, name)?;
    let png = encode_png(&transformed)?;

    let elapsed = started.elapsed();
    metrics::histogram!("pixelforge_transform_duration_seconds", "kind" => kind.name())
        .record(elapsed.as_secs_f64());
    tracing::debug!(
        kind = kind.name(),
        name,
        elapsed_ms = elapsed.as_millis() as u64,
        "Applied transform"
    );

    Ok(png)
}
