use crate::domain::media::MediaMetadata;
use crate::error::PipelineError;

/// 720p -> 1080p is 1.5x; the label default when nothing else is given.
pub const DEFAULT_SCALE: f64 = 1.5;

/// Concrete upscaling factor plus even-rounded target dimensions, computed
/// once from the request and the probed source metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedScale {
    pub factor: f64,
    pub width: u32,
    pub height: u32,
}

impl ResolvedScale {
    /// Precedence: an explicit positive `scale` wins; else a recognized
    /// resolution label ("1080p" -> 1.5, "2k"/"1440p" -> 2.0); else 1.5.
    ///
    /// A non-positive `scale` or an unrecognized non-empty label is rejected
    /// rather than silently defaulted.
    pub fn resolve(
        scale: Option<f64>,
        target_resolution: Option<&str>,
        meta: &MediaMetadata,
    ) -> Result<Self, PipelineError> {
        let factor = match scale {
            Some(s) if s > 0.0 => s,
            Some(s) => {
                return Err(PipelineError::InvalidRequest(format!(
                    "scale must be positive, got {}",
                    s
                )))
            }
            None => match target_resolution.map(normalize_label) {
                Some(label) if label.is_empty() => DEFAULT_SCALE,
                Some(label) => match label.as_str() {
                    "1080p" => 1.5,
                    "2k" | "1440p" => 2.0,
                    other => {
                        return Err(PipelineError::InvalidRequest(format!(
                            "unrecognized target_resolution '{}' (expected 1080p, 2k or 1440p)",
                            other
                        )))
                    }
                },
                None => DEFAULT_SCALE,
            },
        };

        Ok(Self {
            factor,
            width: round_even(meta.width as f64 * factor),
            height: round_even(meta.height as f64 * factor),
        })
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "")
}

/// Nearest even integer. Encoders reject odd dimensions.
fn round_even(value: f64) -> u32 {
    ((value / 2.0).round() as u32) * 2
}
