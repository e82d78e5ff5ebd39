// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Admission check for upload candidates. Looks only at the declared MIME type
// and the byte size; content is never sniffed here.

use cropdoc_core::config::MAX_UPLOAD_BYTES;
use cropdoc_core::error::ValidationError;
use cropdoc_core::types::UploadCandidate;
use tracing::debug;

/// MIME category prefix every accepted file must carry.
pub const IMAGE_PREFIX: &str = "image/";

/// Declared types the prediction service can decode.
pub const SUPPORTED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/bmp",
    "image/tiff",
    "image/webp",
];

/// File-picker extension filter matching [`SUPPORTED_TYPES`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

#[derive(Debug, Clone, Copy)]
pub struct ImageValidator {
    max_bytes: u64,
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES)
    }
}

impl ImageValidator {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Checks run in order: image prefix, size ceiling, supported type.
    pub fn validate(&self, candidate: &UploadCandidate) -> Result<(), ValidationError> {
        let mime = candidate.mime_type.as_str();

        if !mime.starts_with(IMAGE_PREFIX) {
            debug!(mime, "rejected: not an image");
            return Err(ValidationError::NotAnImage);
        }

        let size = candidate.size();
        if size > self.max_bytes {
            debug!(size, limit = self.max_bytes, "rejected: too large");
            return Err(ValidationError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        if !SUPPORTED_TYPES.contains(&mime) {
            debug!(mime, "rejected: unsupported format");
            return Err(ValidationError::UnsupportedFormat(mime.to_string()));
        }

        Ok(())
    }
}

/// Map an image file extension to its MIME type. Anything else is `None`.
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
