//! Detection session controller
//!
//! Owns the analysis state machine and the overlay. The UI drives it with
//! four calls: `file_loaded` / `file_rejected` when a file is picked,
//! `begin_analysis` when Analyze is pressed, and `finish_analysis` when the
//! detection request (or the capture before it) completes.

use log::{debug, info, warn};

use crate::detection::client::DetectionError;
use crate::detection::Detection;
use crate::overlay::OverlayLayer;
use crate::viewer::{CaptureError, DecodeError};

pub const GENERIC_FAILURE_MESSAGE: &str = "Prediction failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    FileLoaded,
    Analyzing,
    ResultsReady,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    FileLoaded,
    FileRejected,
    AnalyzeRequested,
    DetectionsReceived,
    AnalysisFailed,
}

impl AnalysisState {
    /// Pure transition table. `None` means the event is not allowed in this state.
    pub fn next(self, event: SessionEvent) -> Option<AnalysisState> {
        use AnalysisState::*;
        match (self, event) {
            // Picking a file always wins, including over an in-flight analysis
            (_, SessionEvent::FileLoaded) => Some(FileLoaded),
            (_, SessionEvent::FileRejected) => Some(Idle),
            (FileLoaded | ResultsReady | Failed, SessionEvent::AnalyzeRequested) => Some(Analyzing),
            (Analyzing, SessionEvent::DetectionsReceived) => Some(ResultsReady),
            (Analyzing, SessionEvent::AnalysisFailed) => Some(Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Error loading image file ({0}). Please make sure it is a valid image file.")]
    Decode(String),
    #[error("{0}")]
    Capture(String),
    #[error("{0}")]
    Network(String),
    #[error("No objects detected in the image.")]
    EmptyResult,
}

impl SessionError {
    /// An empty result is not a fault and is logged at info level
    pub fn is_informational(&self) -> bool {
        matches!(self, SessionError::EmptyResult)
    }
}

impl From<DecodeError> for SessionError {
    fn from(e: DecodeError) -> Self {
        SessionError::Decode(e.to_string())
    }
}

impl From<CaptureError> for SessionError {
    fn from(e: CaptureError) -> Self {
        SessionError::Capture(e.to_string())
    }
}

impl From<DetectionError> for SessionError {
    fn from(e: DetectionError) -> Self {
        let detail = match &e {
            DetectionError::Request(d) | DetectionError::Status(d) | DetectionError::MalformedResponse(d) => d,
        };
        if detail.trim().is_empty() {
            SessionError::Network(GENERIC_FAILURE_MESSAGE.to_string())
        } else {
            SessionError::Network(e.to_string())
        }
    }
}

/// Identifies one analysis request. Results carrying an outdated ticket
/// belong to a file that is no longer loaded and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket(u64);

#[derive(Debug)]
pub struct DetectionSession {
    state: AnalysisState,
    file_name: Option<String>,
    overlay: OverlayLayer,
    error: Option<SessionError>,
    generation: u64,
}

impl Default for DetectionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionSession {
    pub fn new() -> Self {
        Self {
            state: AnalysisState::Idle,
            file_name: None,
            overlay: OverlayLayer::new(),
            error: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.state == AnalysisState::Analyzing
    }

    /// Analyze is only offered with a file loaded and nothing in flight
    pub fn can_analyze(&self) -> bool {
        self.state.next(SessionEvent::AnalyzeRequested).is_some()
    }

    /// Detections backing the results list; empty unless `ResultsReady`
    pub fn results(&self) -> &[Detection] {
        if self.state == AnalysisState::ResultsReady {
            self.overlay.detections()
        } else {
            &[]
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.results().iter().map(Detection::summary_line).collect()
    }

    fn apply(&mut self, event: SessionEvent) -> bool {
        match self.state.next(event) {
            Some(next) => {
                debug!("Session {:?} --{:?}--> {:?}", self.state, event, next);
                self.state = next;
                true
            }
            None => {
                warn!("Ignoring {:?} while {:?}", event, self.state);
                false
            }
        }
    }

    /// A new file decoded successfully. Any previous results are discarded
    /// and an in-flight analysis for the old file is orphaned.
    pub fn file_loaded(&mut self, file_name: &str) {
        self.generation += 1;
        self.overlay.clear();
        self.error = None;
        self.file_name = Some(file_name.to_string());
        self.apply(SessionEvent::FileLoaded);
        info!("Loaded {}", file_name);
    }

    /// The picked file could not be decoded; the session has no file anymore.
    pub fn file_rejected(&mut self, error: SessionError) {
        self.generation += 1;
        self.overlay.clear();
        self.file_name = None;
        self.apply(SessionEvent::FileRejected);
        warn!("File rejected: {}", error);
        self.error = Some(error);
    }

    /// Enter `Analyzing`, clearing the overlay first.
    /// Returns `None` when analysis is not currently allowed.
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if !self.can_analyze() {
            return None;
        }
        self.overlay.clear();
        self.error = None;
        self.apply(SessionEvent::AnalyzeRequested);
        self.generation += 1;
        Some(AnalysisTicket(self.generation))
    }

    /// Apply the outcome of an analysis. Returns `false` if the ticket is
    /// stale and the outcome was ignored.
    pub fn finish_analysis(
        &mut self,
        ticket: AnalysisTicket,
        outcome: Result<Vec<Detection>, SessionError>,
    ) -> bool {
        if ticket.0 != self.generation || self.state != AnalysisState::Analyzing {
            debug!("Discarding stale analysis result {:?} (current generation {})", ticket, self.generation);
            return false;
        }

        match outcome {
            Ok(detections) if !detections.is_empty() => {
                info!("Analysis finished with {} detection(s)", detections.len());
                self.overlay.replace(detections);
                self.apply(SessionEvent::DetectionsReceived);
            }
            Ok(_) => self.fail(SessionError::EmptyResult),
            Err(e) => self.fail(e),
        }
        true
    }

    fn fail(&mut self, error: SessionError) {
        // The overlay must be empty before the error is surfaced
        self.overlay.clear();
        self.apply(SessionEvent::AnalysisFailed);
        if error.is_informational() {
            info!("{}", error);
        } else {
            warn!("Analysis failed: {}", error);
        }
        self.error = Some(error);
    }
}
