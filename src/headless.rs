//! Window-less pipeline: load, capture, detect, map, print.
//!
//! Drives the same `Viewer` + `DetectionSession` pair as the GUI so the
//! state transitions and error messages are identical.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::config::Config;
use crate::detection::client::DetectionClient;
use crate::detection::{map_to_display, ConfidenceTier, Detection, DisplayBox, ViewportGeometry};
use crate::file_io;
use crate::session::{AnalysisState, DetectionSession, SessionError};
use crate::viewer::{ScanDecoder, Viewer};

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ReportEntry<'a> {
    #[serde(flatten)]
    detection: &'a Detection,
    tier: ConfidenceTier,
    display_box: DisplayBox,
}

/// Text (or JSON) for a session after analysis has finished
pub fn render_report(session: &DetectionSession, geometry: &ViewportGeometry, json: bool) -> Result<String, serde_json::Error> {
    if json {
        let entries: Vec<ReportEntry> = session
            .results()
            .iter()
            .map(|detection| ReportEntry {
                detection,
                tier: detection.tier(),
                display_box: map_to_display(detection, geometry),
            })
            .collect();
        serde_json::to_string_pretty(&entries)
    } else {
        Ok(session.summary_lines().join("\n"))
    }
}

pub fn run(config: &Config, path: &Path, json: bool) -> Result<(), HeadlessError> {
    let bytes = std::fs::read(path).map_err(|source| HeadlessError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut viewer = Viewer::new(
        Box::new(ScanDecoder),
        config.viewport_width.round() as u32,
        config.viewport_height.round() as u32,
    );
    let mut session = DetectionSession::new();

    if let Err(e) = viewer.load(&bytes) {
        let error = SessionError::from(e);
        session.file_rejected(error.clone());
        return Err(error.into());
    }
    let name = file_io::get_filename(path).unwrap_or_else(|| path.display().to_string());
    session.file_loaded(&name);

    let Some(ticket) = session.begin_analysis() else {
        return Ok(());
    };

    let outcome = match viewer.capture_png() {
        Ok(png) => {
            let client = DetectionClient::new(&config.detection_endpoint, &config.api_key)
                .map_err(SessionError::from)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(HeadlessError::Runtime)?;
            runtime.block_on(client.detect(png)).map_err(SessionError::from)
        }
        Err(e) => Err(e.into()),
    };
    session.finish_analysis(ticket, outcome);
    debug!("Headless session ended in {:?}", session.state());

    let geometry = ViewportGeometry::from_viewport(config.model_input_size, config.viewport_width, config.viewport_height);
    match (session.state(), session.error()) {
        (AnalysisState::ResultsReady, _) => {
            println!("{}", render_report(&session, &geometry, json)?);
            Ok(())
        }
        (_, Some(error)) if error.is_informational() => {
            info!("{}", error);
            if json {
                println!("[]");
            } else {
                println!("{}", error);
            }
            Ok(())
        }
        (_, Some(error)) => Err(error.clone().into()),
        (state, None) => {
            debug!("No results to report in state {:?}", state);
            Ok(())
        }
    }
}
