// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for farmers in the field.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the error banner is coloured.

use crate::error::{CropdocError, ValidationError};
use crate::types::{FailureKind, PredictionFailure};

/// Shown when a prediction does not answer in time.
pub const TIMEOUT_MESSAGE: &str = "Request timed out - the backend may be starting up";

/// Shown when the preview could not be produced.
pub const PROCESS_IMAGE_MESSAGE: &str =
    "Failed to process image. Try using a smaller image or restart the app.";

/// Shown when exporting results fails.
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to save results";

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip, timeout, or a cold start. Trying again usually works.
    Transient,
    /// User must do something (pick another photo).
    ActionRequired,
    /// Cannot be fixed by retrying.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether pressing "Start Analysis" again may help.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `CropdocError` into a `HumanError`.
pub fn humanize_error(err: &CropdocError) -> HumanError {
    match err {
        CropdocError::Validation(v) => humanize_validation(v),

        CropdocError::ImageError(_) | CropdocError::Preview(_) => HumanError {
            message: PROCESS_IMAGE_MESSAGE.into(),
            suggestion: "Take the photo again, or choose a JPEG or PNG under 10MB.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CropdocError::Timeout(_) => HumanError {
            message: TIMEOUT_MESSAGE.into(),
            suggestion: "The diagnosis service may be waking up. Wait a few seconds and tap Start Analysis again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CropdocError::Network(_) => HumanError {
            message: "Network error. Please check your connection and try again.".into(),
            suggestion: "Make sure you have mobile data or Wi-Fi, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CropdocError::Server(detail) => HumanError {
            message: detail.clone(),
            suggestion: "The diagnosis service could not read this photo. Try a clearer, closer picture of one leaf.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CropdocError::MalformedResponse(_) => HumanError {
            message: "The diagnosis service sent an answer we couldn't read.".into(),
            suggestion: "Try again. If this keeps happening, the service may be updating.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        CropdocError::NoImageSelected => HumanError {
            message: "No image selected".into(),
            suggestion: "Go back and take or choose a photo of the crop first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CropdocError::Export(_) | CropdocError::Io(_) | CropdocError::Serialization(_) => {
            HumanError {
                message: EXPORT_FAILED_MESSAGE.into(),
                suggestion: "Check there is free space on your device and try saving again.".into(),
                retriable: true,
                severity: Severity::Transient,
            }
        }
    }
}

fn humanize_validation(err: &ValidationError) -> HumanError {
    let suggestion = match err {
        ValidationError::NotAnImage => "Choose a photo of the crop, not a document or video.",
        ValidationError::TooLarge { .. } => "Take the photo again at a lower resolution, or crop it.",
        ValidationError::UnsupportedFormat(_) => "Save the photo as JPG or PNG, then try again.",
    };
    HumanError {
        message: err.to_string(),
        suggestion: suggestion.into(),
        retriable: false,
        severity: Severity::ActionRequired,
    }
}

/// Convert a prediction failure into the error it represents.
pub fn failure_to_error(failure: &PredictionFailure, timeout_secs: u64) -> CropdocError {
    match failure.kind {
        FailureKind::Timeout => CropdocError::Timeout(timeout_secs),
        FailureKind::Network => CropdocError::Network(failure.message.clone()),
        FailureKind::Server | FailureKind::InvalidInput => {
            CropdocError::Server(failure.message.clone())
        }
        FailureKind::MalformedResponse => CropdocError::MalformedResponse(failure.message.clone()),
    }
}
