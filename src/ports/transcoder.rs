use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Output;

/// Contract with the external audio/video transcoder.
///
/// Implementations only run the tool and hand back the raw `Output`;
/// exit-status policy and parsing stay in the pipeline. That keeps a
/// library-call adapter swappable for the CLI one without touching
/// orchestration.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MediaTranscoder: Send + Sync {
    /// Stream/format inspection, JSON on stdout.
    async fn run_probe(&self, source: &Path) -> io::Result<Output>;

    /// Decompose `source` into still frames following `frame_pattern`, at the
    /// source's native resolution and frame rate.
    async fn run_extract_frames(&self, source: &Path, frame_pattern: &Path) -> io::Result<Output>;

    /// Encode a frame sequence into a video stream.
    async fn run_encode_frames(
        &self,
        frame_pattern: &Path,
        fps: f64,
        crf: u32,
        preset: &str,
        output: &Path,
    ) -> io::Result<Output>;

    /// Mux the audio stream of `audio_source` into `video` without
    /// re-encoding either stream.
    async fn run_mux_audio(
        &self,
        video: &Path,
        audio_source: &Path,
        output: &Path,
    ) -> io::Result<Output>;
}
