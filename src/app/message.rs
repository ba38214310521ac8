use std::path::PathBuf;

use crate::detection::client::DetectionError;
use crate::detection::Detection;
use crate::file_io;
use crate::session::AnalysisTicket;

#[derive(Debug, Clone)]
pub enum Message {
    OpenFile,
    FileSelected(Result<PathBuf, file_io::Error>),
    FileRead(PathBuf, Result<Vec<u8>, file_io::Error>),
    Analyze,
    AnalysisFinished(AnalysisTicket, Result<Vec<Detection>, DetectionError>),
    ExportDebugLogs,
}
