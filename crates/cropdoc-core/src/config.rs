// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the prediction service base URL.
pub const API_URL_ENV: &str = "CROPDOC_API_URL";

/// Production prediction service, used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str =
    "https://crop-backend-api-b8byddeccga5cug5.centralindia-01.azurewebsites.net";

/// Hard ceiling for any uploaded image (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Images at or below this size are uploaded untouched (2 MiB).
pub const TRANSCODE_THRESHOLD_BYTES: u64 = 2 * 1024 * 1024;

/// Longest edge of a transcoded image, in pixels.
pub const MAX_DIMENSION: u32 = 1024;

/// JPEG quality used when re-encoding (the 0.8 quality factor).
pub const JPEG_QUALITY: u8 = 80;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the prediction service (no trailing slash required).
    pub api_base_url: String,
    /// Client-side timeout for `POST /predict`.
    pub predict_timeout_secs: u64,
    /// Client-side timeout for `GET /health`.
    pub health_timeout_secs: u64,
    /// Upload size ceiling in bytes.
    pub max_upload_bytes: u64,
    /// Images larger than this are downscaled and re-encoded.
    pub transcode_threshold_bytes: u64,
    /// Longest edge after downscaling.
    pub max_dimension: u32,
    /// JPEG quality (1-100) for re-encoding.
    pub jpeg_quality: u8,
    /// Where exported results are written. Defaults to `<data dir>/exports`.
    pub export_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            predict_timeout_secs: 30,
            health_timeout_secs: 10,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            transcode_threshold_bytes: TRANSCODE_THRESHOLD_BYTES,
            max_dimension: MAX_DIMENSION,
            jpeg_quality: JPEG_QUALITY,
            export_dir: None,
        }
    }
}

impl AppConfig {
    pub fn predict_timeout(&self) -> Duration {
        Duration::from_secs(self.predict_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Apply an explicit base URL override. Blank values are ignored.
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.map(|u| u.trim().to_string())
            && !url.is_empty()
        {
            self.api_base_url = url;
        }
        self
    }

    /// Apply overrides from the process environment (`CROPDOC_API_URL`).
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url(std::env::var(API_URL_ENV).ok())
    }
}
