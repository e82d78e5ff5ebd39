// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Projection of a successful prediction into what the results screen shows.

use serde::Serialize;
use tracing::warn;

use crate::types::Prediction;

/// UI-facing diagnosis.
///
/// `is_healthy` has no setter: it is derived from `disease` inside
/// [`DisplayResult::from_prediction`] and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayResult {
    pub disease: String,
    /// Confidence as a percentage with one decimal, e.g. `"94.1%"`.
    pub confidence: String,
    pub severity: String,
    pub description: String,
    /// Ordered treatment steps; step 1 first.
    pub treatment: Vec<String>,
    /// Ordered prevention steps.
    pub prevention: Vec<String>,
    pub affected_area: Option<String>,
    is_healthy: bool,
}

impl DisplayResult {
    pub fn from_prediction(prediction: &Prediction) -> Self {
        if !(0.0..=1.0).contains(&prediction.confidence) {
            warn!(
                confidence = prediction.confidence,
                "server confidence outside 0..=1, passing through"
            );
        }
        Self {
            disease: prediction.disease.clone(),
            confidence: format_confidence(prediction.confidence),
            severity: prediction.severity.clone(),
            description: prediction.description.clone(),
            treatment: prediction.treatment.clone(),
            prevention: prediction.prevention.clone(),
            affected_area: prediction.affected_area.clone(),
            is_healthy: is_healthy_label(&prediction.disease),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }

    pub fn severity_tone(&self) -> SeverityTone {
        SeverityTone::from_label(&self.severity)
    }
}

/// Fraction to percentage with exactly one decimal place.
///
/// Exact ties round away from zero; `{:.1}` alone would round them to even.
pub fn format_confidence(fraction: f64) -> String {
    let percent = fraction * 100.0;
    let tenths = percent * 10.0;
    if tenths.fract().abs() == 0.5 {
        format!("{:.1}%", tenths.round() / 10.0)
    } else {
        format!("{percent:.1}%")
    }
}

/// Case-insensitive substring match on the server's label.
pub fn is_healthy_label(disease: &str) -> bool {
    disease.to_lowercase().contains("healthy")
}

/// Colour band for a severity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTone {
    Critical,
    High,
    Medium,
    Low,
    None,
    Unknown,
}

impl SeverityTone {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            "none" => Self::None,
            _ => Self::Unknown,
        }
    }

    /// (foreground, background) CSS colours.
    pub fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Self::Critical => ("#dc2626", "#fee2e2"),
            Self::High => ("#ea580c", "#ffedd5"),
            Self::Medium => ("#ca8a04", "#fef9c3"),
            Self::Low => ("#2563eb", "#dbeafe"),
            Self::None => ("#16a34a", "#dcfce7"),
            Self::Unknown => ("#4b5563", "#f3f4f6"),
        }
    }
}
