// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Cropdoc.

use thiserror::Error;

/// Why an upload candidate was refused before any processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a valid image file")]
    NotAnImage,

    #[error("Image file is too large. Maximum size is 10MB.")]
    TooLarge { size: u64, limit: u64 },

    #[error("Unsupported image format. Please use JPG, PNG, BMP, TIFF, or WebP.")]
    UnsupportedFormat(String),
}

/// Top-level error type for all Cropdoc operations.
#[derive(Debug, Error)]
pub enum CropdocError {
    // -- Pre-flight errors --
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("preview encoding failed: {0}")]
    Preview(String),

    // -- Network errors --
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("server rejected the request: {0}")]
    Server(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    // -- Session errors --
    #[error("no image selected")]
    NoImageSelected,

    #[error("export failed: {0}")]
    Export(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CropdocError>;
