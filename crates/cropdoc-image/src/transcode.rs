// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload transcoder — keeps large camera photos from turning into huge
// uploads. Small files pass through untouched; anything above the threshold
// is downscaled so its longest edge fits `max_dimension` and re-encoded as
// JPEG. Failure never blocks the user: the original file is returned instead.

use chrono::Utc;
use cropdoc_core::AppConfig;
use cropdoc_core::config::{JPEG_QUALITY, MAX_DIMENSION, TRANSCODE_THRESHOLD_BYTES};
use cropdoc_core::error::CropdocError;
use cropdoc_core::types::{PreparedImage, UploadCandidate};
use image::DynamicImage;
use image::imageops::FilterType;
use tracing::{debug, info, instrument, warn};

/// MIME type of every transcoded image.
pub const TRANSCODED_MIME: &str = "image/jpeg";

/// Size policy for uploads.
#[derive(Debug, Clone, Copy)]
pub struct ImageTranscoder {
    threshold_bytes: u64,
    max_dimension: u32,
    quality: u8,
}

impl Default for ImageTranscoder {
    fn default() -> Self {
        Self {
            threshold_bytes: TRANSCODE_THRESHOLD_BYTES,
            max_dimension: MAX_DIMENSION,
            quality: JPEG_QUALITY,
        }
    }
}

impl ImageTranscoder {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            threshold_bytes: config.transcode_threshold_bytes,
            max_dimension: config.max_dimension,
            quality: config.jpeg_quality.clamp(1, 100),
        }
    }

    /// Produce the image that will be previewed and uploaded.
    #[instrument(skip_all, fields(name = %candidate.name, size = candidate.size()))]
    pub fn transcode(&self, candidate: UploadCandidate) -> PreparedImage {
        if candidate.size() <= self.threshold_bytes {
            debug!("below threshold, passing through");
            return PreparedImage::passthrough(candidate);
        }

        // The decoded pixel buffer lives only inside `shrink`, so it is freed
        // on both the success and the error path.
        match self.shrink(&candidate.bytes) {
            Ok(jpeg) => {
                info!(
                    from_mb = mb(candidate.size()),
                    to_mb = mb(jpeg.len() as u64),
                    "image compressed"
                );
                PreparedImage {
                    name: candidate.name,
                    mime_type: TRANSCODED_MIME.to_string(),
                    bytes: jpeg,
                    modified_at: Utc::now(),
                    transcoded: true,
                }
            }
            Err(err) => {
                warn!(error = %err, "compression failed, uploading original");
                PreparedImage::passthrough(candidate)
            }
        }
    }

    /// Run [`Self::transcode`] on the blocking pool.
    pub async fn transcode_async(&self, candidate: UploadCandidate) -> PreparedImage {
        let transcoder = *self;
        let fallback = candidate.clone();
        match tokio::task::spawn_blocking(move || transcoder.transcode(candidate)).await {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(error = %err, "transcode task failed, uploading original");
                PreparedImage::passthrough(fallback)
            }
        }
    }

    fn shrink(&self, data: &[u8]) -> Result<Vec<u8>, CropdocError> {
        let image = image::load_from_memory(data)
            .map_err(|err| CropdocError::ImageError(format!("failed to decode image: {err}")))?;
        let (width, height) = fit_within(image.width(), image.height(), self.max_dimension);
        debug!(
            from_w = image.width(),
            from_h = image.height(),
            to_w = width,
            to_h = height,
            "resizing"
        );
        let resized = if (width, height) == (image.width(), image.height()) {
            image
        } else {
            image.resize_exact(width, height, FilterType::Triangle)
        };
        to_jpeg_bytes(&resized, self.quality)
    }
}

/// Scale `(width, height)` so the longer edge is at most `max_edge`,
/// preserving aspect ratio. Images already within bounds are unchanged.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 {
        return (width, height);
    }
    let scale = max_edge as f64 / longest as f64;
    if scale >= 1.0 {
        return (width, height);
    }
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Encode as baseline JPEG with the given quality (1-100).
pub fn to_jpeg_bytes(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CropdocError> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| CropdocError::ImageError(format!("JPEG encoding failed: {err}")))?;
    Ok(buffer)
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
