// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Cropdoc scanner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file the user picked or dropped, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    /// Original file name (used for the multipart field and exports).
    pub name: String,
    /// Declared MIME type. Never sniffed from content.
    pub mime_type: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Byte size of the content.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A validated, possibly downscaled image ready for preview and upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// When this content was produced (fresh for transcoded images).
    pub modified_at: DateTime<Utc>,
    /// Whether the content was re-encoded by the transcoder.
    pub transcoded: bool,
}

impl PreparedImage {
    /// Wrap a candidate unchanged.
    pub fn passthrough(candidate: UploadCandidate) -> Self {
        Self {
            name: candidate.name,
            mime_type: candidate.mime_type,
            bytes: candidate.bytes,
            modified_at: Utc::now(),
            transcoded: false,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Self-contained `data:` URI rendering of a prepared image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewString(String);

impl PreviewString {
    pub fn new(data_uri: String) -> Self {
        Self(data_uri)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PreviewString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Successful diagnosis as returned by `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub disease: String,
    /// Fraction in 0..=1 as sent by the server. Not clamped.
    pub confidence: f64,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub treatment: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub affected_area: Option<String>,
}

/// Which stage of a prediction call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Refused by the client before sending (type or size).
    InvalidInput,
    /// No response within the client-side deadline.
    Timeout,
    /// Connection could not be made or was dropped.
    Network,
    /// Server answered with a non-success status.
    Server,
    /// Server answered 2xx with a body we could not read.
    MalformedResponse,
}

/// A failed prediction attempt with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Normalized result of one prediction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Success(Prediction),
    Failure(PredictionFailure),
}

impl PredictionOutcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure(PredictionFailure {
            kind,
            message: message.into(),
        })
    }
}

/// The single active screen of the guided flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenState {
    Home,
    Analyze,
    Results,
    About,
}

impl ScreenState {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Crop Doctor",
            Self::Analyze => "Analyze Crop",
            Self::Results => "Scan Results",
            Self::About => "How It Works",
        }
    }
}
