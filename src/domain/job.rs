use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub const DEFAULT_CRF: u32 = 20;
pub const DEFAULT_PRESET: &str = "medium";

/// One pipeline run's immutable input, as posted by the caller.
///
/// `video_url` wins over `file_path` when both are present and non-empty.
/// `scale` overrides `target_resolution`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRequest {
    pub video_url: Option<String>,
    pub file_path: Option<String>,
    pub target_resolution: Option<String>,
    pub scale: Option<f64>,
    pub model: Option<String>,
    pub output_fps: Option<f64>,
    pub crf: Option<u32>,
    pub preset: Option<String>,
}

impl JobRequest {
    /// URL source, if present and non-empty.
    pub fn url(&self) -> Option<&str> {
        self.video_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Local-path source, if present and non-empty.
    pub fn local_path(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn crf_or_default(&self) -> u32 {
        self.crf.unwrap_or(DEFAULT_CRF)
    }

    pub fn preset_or_default(&self) -> &str {
        match self.preset.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => DEFAULT_PRESET,
        }
    }

    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.model.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m,
            _ => default,
        }
    }
}

/// Echo of the parameters a finished job actually ran with.
#[derive(Debug, Clone, Serialize)]
pub struct JobParams {
    pub scale: f64,
    pub model: String,
    pub target_resolution: Option<String>,
    pub crf: u32,
    pub preset: String,
    pub output_fps: f64,
}

/// Terminal value of a job: either the inline artifact or a structured error.
/// Exactly one of the two shapes is produced; the error path never fills
/// success fields.
#[derive(Debug, Serialize)]
pub struct JobResult {
    pub output_url: Option<String>,
    pub output_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<JobParams>,
    pub error: Option<String>,
}

impl JobResult {
    pub fn success(artifact: &[u8], params: JobParams) -> Self {
        Self {
            output_url: None,
            output_base64: Some(STANDARD.encode(artifact)),
            content_type: Some(String::from("video/mp4")),
            filename: Some(String::from("upscaled.mp4")),
            params: Some(params),
            error: None,
        }
    }

    pub fn failure(err: PipelineError) -> Self {
        Self {
            output_url: None,
            output_base64: None,
            content_type: None,
            filename: None,
            params: None,
            error: Some(err.to_string()),
        }
    }
}
