//! Pipeline error taxonomy.
//!
//! Every stage converts its failures into one of these variants at the point
//! of failure. Messages carry the stage and the tool's reported cause so the
//! caller can diagnose from the response alone.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad or missing request fields, including unrecognized resolution labels.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Source download failed or produced an empty file.
    #[error("Download failed or empty file: {0}")]
    Download(String),

    /// A caller-supplied local path does not point at a usable file.
    #[error("File not found: {0}")]
    InputNotFound(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    #[error("Frame extraction failed: {0}")]
    Extraction(String),

    #[error("Upscale failed: {0}")]
    Upscale(String),

    #[error("Reassembly failed: {0}")]
    Reassembly(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Internal(err.to_string())
    }
}

/// Trailing lines of a tool's stderr, joined for a single-line error message.
pub fn stderr_tail(stderr: &[u8]) -> String {
    const TAIL_LINES: usize = 8;

    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join(" | ")
}
