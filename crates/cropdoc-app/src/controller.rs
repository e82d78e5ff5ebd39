// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Screen controller: owns the scanner session and applies every screen
// transition. Pages hold it in one `Signal` and only mutate it from the UI
// task.
//
// Async work is split into ticketed begin/finish pairs:
//
//   begin_upload   → UploadTicket::prepare().await → finish_upload
//   begin_analysis → PredictionClient::predict().await → finish_analysis
//
// A finish whose ticket is no longer pending is stale and dropped, so a
// late reply can never resurrect a screen the user already left.

use tracing::{debug, info, warn};

use cropdoc_core::AppConfig;
use cropdoc_core::error::Result;
use cropdoc_core::human_errors::{
    HumanError, PROCESS_IMAGE_MESSAGE, failure_to_error, humanize_error,
};
use cropdoc_core::result::DisplayResult;
use cropdoc_core::types::{
    PredictionOutcome, PreparedImage, PreviewString, ScreenState, UploadCandidate,
};
use cropdoc_core::CropdocError;
use cropdoc_image::{ImageTranscoder, ImageValidator, PreviewHandle, PreviewRegistry, encode_preview};

// -- Tickets ------------------------------------------------------------------

/// A validated upload waiting to be transcoded and previewed.
#[derive(Debug)]
pub struct UploadTicket {
    id: u64,
    candidate: UploadCandidate,
    transcoder: ImageTranscoder,
}

impl UploadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Transcode and encode the preview off the UI thread.
    pub async fn prepare(self) -> PreparedUpload {
        let image = self.transcoder.transcode_async(self.candidate).await;
        let preview = encode_preview(&image).await;
        PreparedUpload {
            id: self.id,
            image,
            preview,
        }
    }
}

/// Output of [`UploadTicket::prepare`], handed back to [`ViewController::finish_upload`].
#[derive(Debug)]
pub struct PreparedUpload {
    id: u64,
    image: PreparedImage,
    preview: Result<PreviewString>,
}

/// An analysis request in flight.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    id: u64,
    image: PreparedImage,
}

impl AnalysisTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn image(&self) -> &PreparedImage {
        &self.image
    }
}

// -- Controller ---------------------------------------------------------------

pub struct ViewController {
    screen: ScreenState,
    image: Option<PreparedImage>,
    preview: Option<PreviewHandle>,
    result: Option<DisplayResult>,
    error: Option<HumanError>,
    pending_upload: Option<u64>,
    pending_attempt: Option<u64>,
    next_upload_id: u64,
    next_attempt_id: u64,
    registry: PreviewRegistry,
    validator: ImageValidator,
    transcoder: ImageTranscoder,
    predict_timeout_secs: u64,
}

impl ViewController {
    pub fn new(config: &AppConfig, registry: PreviewRegistry) -> Self {
        Self {
            screen: ScreenState::Home,
            image: None,
            preview: None,
            result: None,
            error: None,
            pending_upload: None,
            pending_attempt: None,
            next_upload_id: 0,
            next_attempt_id: 0,
            registry,
            validator: ImageValidator::new(config.max_upload_bytes),
            transcoder: ImageTranscoder::from_config(config),
            predict_timeout_secs: config.predict_timeout_secs,
        }
    }

    // -- Read access --

    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    pub fn image(&self) -> Option<&PreparedImage> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<PreviewString> {
        self.preview.and_then(|h| self.registry.get(h))
    }

    pub fn result(&self) -> Option<&DisplayResult> {
        self.result.as_ref()
    }

    /// The message in the error slot.
    pub fn error(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// The full error, including the suggested next step.
    pub fn error_detail(&self) -> Option<&HumanError> {
        self.error.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.pending_attempt.is_some()
    }

    pub fn is_preparing(&self) -> bool {
        self.pending_upload.is_some()
    }

    // -- Upload --

    /// Accept a picked or dropped file. Returns a ticket when it passes
    /// validation; otherwise the reason lands in the error slot.
    pub fn begin_upload(&mut self, candidate: UploadCandidate) -> Option<UploadTicket> {
        if self.screen != ScreenState::Home {
            debug!(screen = ?self.screen, "upload ignored outside home");
            return None;
        }

        // Any newer pick supersedes one still being prepared.
        self.next_upload_id += 1;
        let id = self.next_upload_id;
        self.pending_upload = None;

        if let Err(reason) = self.validator.validate(&candidate) {
            warn!(name = %candidate.name, mime = %candidate.mime_type, %reason, "upload rejected");
            self.error = Some(humanize_error(&CropdocError::Validation(reason)));
            return None;
        }

        info!(id, name = %candidate.name, size = candidate.size(), "upload accepted");
        self.error = None;
        self.pending_upload = Some(id);
        Some(UploadTicket {
            id,
            candidate,
            transcoder: self.transcoder,
        })
    }

    /// Apply a prepared upload. Returns `false` when it was stale.
    pub fn finish_upload(&mut self, prepared: PreparedUpload) -> bool {
        if self.pending_upload != Some(prepared.id) || self.screen != ScreenState::Home {
            debug!(id = prepared.id, "stale upload discarded");
            return false;
        }
        self.pending_upload = None;

        let preview = match prepared.preview {
            Ok(preview) => preview,
            Err(e) => {
                warn!(id = prepared.id, error = %e, "preview encoding failed");
                let mut human = humanize_error(&e);
                human.message = PROCESS_IMAGE_MESSAGE.into();
                self.error = Some(human);
                return true;
            }
        };

        self.release_preview();
        self.preview = Some(self.registry.register(preview));
        self.image = Some(prepared.image);
        self.result = None;
        self.error = None;
        self.screen = ScreenState::Analyze;
        info!(id = prepared.id, "image ready for analysis");
        true
    }

    // -- Analysis --

    /// Start an analysis attempt for the held image.
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if self.screen != ScreenState::Analyze {
            debug!(screen = ?self.screen, "analysis ignored outside analyze");
            return None;
        }
        if self.pending_attempt.is_some() {
            debug!("analysis already running");
            return None;
        }
        let Some(image) = self.image.clone() else {
            self.error = Some(humanize_error(&CropdocError::NoImageSelected));
            return None;
        };

        self.next_attempt_id += 1;
        let id = self.next_attempt_id;
        self.pending_attempt = Some(id);
        self.error = None;
        info!(id, name = %image.name, "analysis started");
        Some(AnalysisTicket { id, image })
    }

    /// Apply a prediction outcome. Returns `false` when it was stale.
    pub fn finish_analysis(&mut self, attempt_id: u64, outcome: PredictionOutcome) -> bool {
        if self.pending_attempt != Some(attempt_id) || self.screen != ScreenState::Analyze {
            debug!(attempt_id, "stale prediction discarded");
            return false;
        }
        self.pending_attempt = None;

        match outcome {
            PredictionOutcome::Success(prediction) => {
                let shown = DisplayResult::from_prediction(&prediction);
                info!(attempt_id, disease = %shown.disease, confidence = %shown.confidence, "analysis complete");
                self.result = Some(shown);
                self.error = None;
                self.screen = ScreenState::Results;
            }
            PredictionOutcome::Failure(failure) => {
                warn!(attempt_id, kind = ?failure.kind, message = %failure.message, "analysis failed");
                let mut human =
                    humanize_error(&failure_to_error(&failure, self.predict_timeout_secs));
                human.message = failure.message;
                self.error = Some(human);
            }
        }
        true
    }

    // -- Navigation --

    pub fn show_about(&mut self) {
        if self.screen == ScreenState::Home {
            self.error = None;
            self.screen = ScreenState::About;
        }
    }

    /// Step back one screen.
    pub fn back(&mut self) {
        self.error = None;
        self.screen = match self.screen {
            ScreenState::Analyze => {
                if self.pending_attempt.take().is_some() {
                    debug!("in-flight analysis abandoned");
                }
                ScreenState::Home
            }
            ScreenState::Results => ScreenState::Analyze,
            ScreenState::About | ScreenState::Home => ScreenState::Home,
        };
    }

    /// Reset to an empty home screen. Safe to call repeatedly.
    pub fn scan_another(&mut self) {
        self.release_preview();
        self.image = None;
        self.result = None;
        self.error = None;
        self.pending_upload = None;
        self.pending_attempt = None;
        self.screen = ScreenState::Home;
    }

    /// Put a failure from outside the controller's own flows (export) in the error slot.
    pub fn report(&mut self, err: &CropdocError) {
        self.error = Some(humanize_error(err));
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn release_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.registry.release(handle);
        }
    }
}

impl Drop for ViewController {
    fn drop(&mut self) {
        self.release_preview();
    }
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("screen", &self.screen)
            .field("has_image", &self.image.is_some())
            .field("has_result", &self.result.is_some())
            .field("error", &self.error())
            .field("pending_upload", &self.pending_upload)
            .field("pending_attempt", &self.pending_attempt)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropdoc_core::human_errors::{EXPORT_FAILED_MESSAGE, TIMEOUT_MESSAGE};
    use cropdoc_core::types::{FailureKind, Prediction};

    fn controller() -> (ViewController, PreviewRegistry) {
        let registry = PreviewRegistry::new();
        (ViewController::new(&AppConfig::default(), registry.clone()), registry)
    }

    fn leaf() -> UploadCandidate {
        UploadCandidate::new("leaf.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    fn blight() -> PredictionOutcome {
        PredictionOutcome::Success(Prediction {
            disease: "Early Blight".into(),
            confidence: 0.941,
            severity: "Medium".into(),
            treatment: vec!["Remove leaves".into(), "Apply fungicide".into()],
            prevention: vec!["Rotate crops".into()],
            description: "Fungal disease".into(),
            affected_area: None,
        })
    }

    async fn upload(ctl: &mut ViewController) {
        let ticket = ctl.begin_upload(leaf()).expect("accepted");
        let prepared = ticket.prepare().await;
        assert!(ctl.finish_upload(prepared));
    }

    #[tokio::test]
    async fn accepted_upload_moves_to_analyze_with_preview() {
        let (mut ctl, registry) = controller();
        let ticket = ctl.begin_upload(leaf()).unwrap();
        assert!(ctl.is_preparing());
        assert!(ctl.finish_upload(ticket.prepare().await));

        assert_eq!(ctl.screen(), ScreenState::Analyze);
        assert!(ctl.preview().unwrap().as_str().starts_with("data:image/png;base64,"));
        assert!(ctl.error().is_none());
        assert!(!ctl.is_preparing());
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn rejected_upload_stays_home_with_reason() {
        let (mut ctl, registry) = controller();
        let doc = UploadCandidate::new("notes.pdf", "application/pdf", vec![1, 2]);
        assert!(ctl.begin_upload(doc).is_none());

        assert_eq!(ctl.screen(), ScreenState::Home);
        assert_eq!(ctl.error(), Some("Please select a valid image file"));
        assert!(ctl.preview().is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn oversized_upload_reports_size_limit() {
        let (mut ctl, _) = controller();
        let big = UploadCandidate::new("big.jpg", "image/jpeg", vec![0; 10 * 1024 * 1024 + 1]);
        assert!(ctl.begin_upload(big).is_none());
        assert_eq!(ctl.error(), Some("Image file is too large. Maximum size is 10MB."));
    }

    #[tokio::test]
    async fn superseded_upload_is_discarded() {
        let (mut ctl, registry) = controller();
        let first = ctl.begin_upload(leaf()).unwrap();
        let second = ctl.begin_upload(leaf()).unwrap();
        assert!(second.id() > first.id());

        assert!(!ctl.finish_upload(first.prepare().await));
        assert_eq!(ctl.screen(), ScreenState::Home);
        assert!(ctl.finish_upload(second.prepare().await));
        assert_eq!(registry.live_count(), 1);
    }

    #[tokio::test]
    async fn preview_failure_sets_processing_message() {
        let (mut ctl, registry) = controller();
        let ticket = ctl.begin_upload(leaf()).unwrap();
        let mut prepared = ticket.prepare().await;
        prepared.preview = Err(CropdocError::Preview("worker panicked".into()));

        assert!(ctl.finish_upload(prepared));
        assert_eq!(ctl.screen(), ScreenState::Home);
        assert_eq!(ctl.error(), Some(PROCESS_IMAGE_MESSAGE));
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn new_upload_releases_previous_preview() {
        let (mut ctl, registry) = controller();
        upload(&mut ctl).await;
        ctl.back();
        upload(&mut ctl).await;
        assert_eq!(registry.live_count(), 1);
    }

    #[tokio::test]
    async fn successful_analysis_shows_results() {
        let (mut ctl, _) = controller();
        upload(&mut ctl).await;

        let ticket = ctl.begin_analysis().unwrap();
        assert!(ctl.is_analyzing());
        assert!(ctl.begin_analysis().is_none());
        assert!(ctl.finish_analysis(ticket.id(), blight()));

        assert_eq!(ctl.screen(), ScreenState::Results);
        assert!(!ctl.is_analyzing());
        let result = ctl.result().unwrap();
        assert_eq!(result.confidence, "94.1%");
        assert!(!result.is_healthy());
    }

    #[tokio::test]
    async fn timeout_keeps_analyze_and_clears_flag() {
        let (mut ctl, _) = controller();
        upload(&mut ctl).await;

        let ticket = ctl.begin_analysis().unwrap();
        let outcome = PredictionOutcome::failure(FailureKind::Timeout, TIMEOUT_MESSAGE);
        assert!(ctl.finish_analysis(ticket.id(), outcome));

        assert_eq!(ctl.screen(), ScreenState::Analyze);
        assert!(!ctl.is_analyzing());
        assert_eq!(ctl.error(), Some(TIMEOUT_MESSAGE));
        assert!(ctl.error_detail().unwrap().retriable);
    }

    #[tokio::test]
    async fn reply_after_back_is_stale() {
        let (mut ctl, _) = controller();
        upload(&mut ctl).await;

        let ticket = ctl.begin_analysis().unwrap();
        ctl.back();
        assert_eq!(ctl.screen(), ScreenState::Home);
        assert!(!ctl.is_analyzing());

        assert!(!ctl.finish_analysis(ticket.id(), blight()));
        assert_eq!(ctl.screen(), ScreenState::Home);
        assert!(ctl.result().is_none());
    }

    #[tokio::test]
    async fn retry_after_failure_ignores_old_attempt() {
        let (mut ctl, _) = controller();
        upload(&mut ctl).await;

        let first = ctl.begin_analysis().unwrap();
        ctl.finish_analysis(first.id(), PredictionOutcome::failure(FailureKind::Network, "down"));
        let second = ctl.begin_analysis().unwrap();

        assert!(!ctl.finish_analysis(first.id(), blight()));
        assert!(ctl.is_analyzing());
        assert!(ctl.finish_analysis(second.id(), blight()));
    }

    #[test]
    fn analysis_without_image_reports_it() {
        let (mut ctl, _) = controller();
        ctl.screen = ScreenState::Analyze;
        assert!(ctl.begin_analysis().is_none());
        assert_eq!(ctl.error(), Some("No image selected"));
    }

    #[tokio::test]
    async fn scan_another_is_idempotent() {
        let (mut ctl, registry) = controller();
        upload(&mut ctl).await;
        let ticket = ctl.begin_analysis().unwrap();
        ctl.finish_analysis(ticket.id(), blight());

        ctl.scan_another();
        ctl.scan_another();

        assert_eq!(ctl.screen(), ScreenState::Home);
        assert!(ctl.image().is_none());
        assert!(ctl.result().is_none());
        assert!(ctl.preview().is_none());
        assert!(ctl.error().is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn results_back_returns_to_analyze() {
        let (mut ctl, _) = controller();
        upload(&mut ctl).await;
        let ticket = ctl.begin_analysis().unwrap();
        ctl.finish_analysis(ticket.id(), blight());

        ctl.back();
        assert_eq!(ctl.screen(), ScreenState::Analyze);
        assert!(ctl.preview().is_some());
    }

    #[test]
    fn about_round_trip_clears_error() {
        let (mut ctl, _) = controller();
        ctl.begin_upload(UploadCandidate::new("a.txt", "text/plain", vec![]));
        assert!(ctl.error().is_some());

        ctl.show_about();
        assert_eq!(ctl.screen(), ScreenState::About);
        assert!(ctl.error().is_none());
        ctl.back();
        assert_eq!(ctl.screen(), ScreenState::Home);
    }

    #[tokio::test]
    async fn uploads_outside_home_are_ignored() {
        let (mut ctl, _) = controller();
        upload(&mut ctl).await;
        assert!(ctl.begin_upload(leaf()).is_none());
        assert_eq!(ctl.screen(), ScreenState::Analyze);
    }

    #[test]
    fn reported_export_failure_uses_save_message() {
        let (mut ctl, _) = controller();
        ctl.report(&CropdocError::Export("read-only".into()));
        assert_eq!(ctl.error(), Some(EXPORT_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn drop_releases_preview() {
        let (mut ctl, registry) = controller();
        upload(&mut ctl).await;
        drop(ctl);
        assert_eq!(registry.live_count(), 0);
    }
}
