// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON export of a finished analysis.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use cropdoc_core::error::{CropdocError, Result};
use cropdoc_core::result::DisplayResult;
use cropdoc_core::types::PreparedImage;

const APP_NAME: &str = "cropdoc";

#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub app: &'static str,
    pub version: &'static str,
    pub export_id: Uuid,
    pub exported_at: DateTime<Utc>,
    pub result: &'a DisplayResult,
    pub image: ExportedImage<'a>,
}

#[derive(Debug, Serialize)]
pub struct ExportedImage<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub size_bytes: u64,
    pub transcoded: bool,
}

impl<'a> ExportDocument<'a> {
    pub fn new(result: &'a DisplayResult, image: &'a PreparedImage, at: DateTime<Utc>) -> Self {
        Self {
            app: APP_NAME,
            version: env!("CARGO_PKG_VERSION"),
            export_id: Uuid::new_v4(),
            exported_at: at,
            result,
            image: ExportedImage {
                name: &image.name,
                mime_type: &image.mime_type,
                size_bytes: image.size(),
                transcoded: image.transcoded,
            },
        }
    }
}

/// Lowercase, with every run of non-alphanumerics collapsed to one `-`.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("result");
    }
    slug
}

/// `crop-analysis-<slug>-<YYYYMMDD-HHMMSS>.json`
pub fn export_file_name(disease: &str, at: DateTime<Utc>) -> String {
    format!(
        "crop-analysis-{}-{}.json",
        slugify(disease),
        at.format("%Y%m%d-%H%M%S")
    )
}

/// Write the export into `dir`, creating it if needed.
#[instrument(skip(result, image), fields(disease = %result.disease))]
pub async fn write_export(
    dir: &Path,
    result: &DisplayResult,
    image: &PreparedImage,
) -> Result<PathBuf> {
    let now = Utc::now();
    let document = ExportDocument::new(result, image, now);
    let json = serde_json::to_vec_pretty(&document)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| CropdocError::Export(format!("cannot create {}: {e}", dir.display())))?;
    let path = dir.join(export_file_name(&result.disease, now));
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| CropdocError::Export(format!("cannot write {}: {e}", path.display())))?;

    info!(path = %path.display(), export_id = %document.export_id, "results exported");
    Ok(path)
}
