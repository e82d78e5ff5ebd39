// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ingestion adapters. The file picker and drag-and-drop both end in an
// `UploadCandidate` handed to `ViewController::begin_upload`.

use std::path::Path;

use tracing::{debug, info};

use cropdoc_core::error::{CropdocError, Result};
use cropdoc_core::types::UploadCandidate;
use cropdoc_image::validate::{IMAGE_PREFIX, SUPPORTED_EXTENSIONS, mime_from_extension};

const UNKNOWN_MIME: &str = "application/octet-stream";

/// Declared MIME type for a file name, judged by extension.
pub fn declared_mime(name: &str) -> &'static str {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_from_extension)
        .unwrap_or(UNKNOWN_MIME)
}

/// Read a file chosen in the picker.
pub async fn candidate_from_path(path: &Path) -> Result<UploadCandidate> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CropdocError::ImageError(format!("cannot read {}: {e}", path.display())))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let mime = declared_mime(&name);
    info!(path = %path.display(), bytes = bytes.len(), mime, "file picked");
    Ok(UploadCandidate::new(name, mime, bytes))
}

/// Index of the first image in a drop, by name and optional declared type.
pub fn first_dropped_image<'a, I>(files: I) -> Option<usize>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    files.into_iter().position(|(name, content_type)| {
        let mime = content_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| declared_mime(name));
        mime.starts_with(IMAGE_PREFIX)
    })
}

/// Build the candidate for a dropped file once its bytes are read.
pub fn candidate_from_drop(
    name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> UploadCandidate {
    let mime = content_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| declared_mime(&name).to_string());
    debug!(name = %name, mime = %mime, bytes = bytes.len(), "file dropped");
    UploadCandidate::new(name, mime, bytes)
}

/// Extensions offered by the file picker.
pub fn picker_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}
