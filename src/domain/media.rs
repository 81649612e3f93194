use regex::Regex;
use serde_json::Value;

use crate::error::PipelineError;

/// Intrinsic properties of the source video. Probed once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration: f64,
    pub has_audio: bool,
}

impl MediaMetadata {
    /// Parse ffprobe `-show_format -show_streams -print_format json` output.
    ///
    /// The first stream with `codec_type == "video"` is the one the pipeline
    /// operates on. Missing dimensions or an unusable frame rate are probe
    /// failures, not defaults.
    pub fn from_probe_output(stdout: &[u8]) -> Result<Self, PipelineError> {
        let v: Value = serde_json::from_slice(stdout)
            .map_err(|e| PipelineError::Probe(format!("unparseable ffprobe output: {}", e)))?;

        let streams = v
            .get("streams")
            .and_then(Value::as_array)
            .ok_or_else(|| PipelineError::Probe(String::from("no streams in ffprobe output")))?;

        let video = streams
            .iter()
            .find(|s| s.get("codec_type").and_then(Value::as_str) == Some("video"))
            .ok_or_else(|| PipelineError::Probe(String::from("no video stream in source")))?;

        let width = video.get("width").and_then(Value::as_u64).unwrap_or(0) as u32;
        let height = video.get("height").and_then(Value::as_u64).unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Err(PipelineError::Probe(String::from(
                "video stream has no usable dimensions",
            )));
        }

        let fps = parse_frame_rate(video)?;

        // Not every container reports a format duration; it is informational
        // only, so absence is not a probe failure.
        let duration = v
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(Value::as_str)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let has_audio = streams
            .iter()
            .any(|s| s.get("codec_type").and_then(Value::as_str) == Some("audio"));

        Ok(Self {
            width,
            height,
            fps,
            duration,
            has_audio,
        })
    }
}

/// Frame rate from `r_frame_rate` (e.g. "30/1", "30000/1001"), falling back
/// to `avg_frame_rate`.
fn parse_frame_rate(video: &Value) -> Result<f64, PipelineError> {
    let re = Regex::new(r"^(\d+)/(\d+)$").unwrap();

    for key in ["r_frame_rate", "avg_frame_rate"] {
        let raw = match video.get(key).and_then(Value::as_str) {
            Some(raw) => raw,
            None => continue,
        };

        if let Some(caps) = re.captures(raw) {
            let num: f64 = caps.get(1).unwrap().as_str().parse().unwrap_or(0.0);
            let den: f64 = caps.get(2).unwrap().as_str().parse().unwrap_or(0.0);
            if num > 0.0 && den > 0.0 {
                return Ok(num / den);
            }
        } else if let Ok(plain) = raw.parse::<f64>() {
            if plain > 0.0 {
                return Ok(plain);
            }
        }
    }

    Err(PipelineError::Probe(String::from(
        "no usable frame rate in video stream",
    )))
}
