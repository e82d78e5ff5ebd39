// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cropdoc-image — Upload pre-flight for the Cropdoc scanner.
//
// Validates candidate files by declared type and size, downscales oversized
// photos to a bounded JPEG, and encodes self-contained previews.

pub mod preview;
pub mod transcode;
pub mod validate;

// Re-export the primary items so callers can use `cropdoc_image::ImageValidator` etc.
pub use preview::{PreviewHandle, PreviewRegistry, encode_preview};
pub use transcode::ImageTranscoder;
pub use validate::ImageValidator;
