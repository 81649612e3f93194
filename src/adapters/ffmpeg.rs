use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Output;
use tokio::process::Command as TokioCommand;

use crate::config::Config;
use crate::ports::transcoder::MediaTranscoder;

/// Drives the `ffmpeg`/`ffprobe` binaries as subprocesses.
pub struct FfmpegTranscoder {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegTranscoder {
    pub fn new(config: &Config) -> Self {
        Self {
            ffmpeg_bin: config.ffmpeg_bin.clone(),
            ffprobe_bin: config.ffprobe_bin.clone(),
        }
    }
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    async fn run_probe(&self, source: &Path) -> io::Result<Output> {
        TokioCommand::new(&self.ffprobe_bin)
            .arg("-v").arg("error")
            .arg("-show_format")
            .arg("-show_streams")
            .arg("-print_format").arg("json")
            .arg(source)
            .output()
            .await
    }

    async fn run_extract_frames(&self, source: &Path, frame_pattern: &Path) -> io::Result<Output> {
        TokioCommand::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-i").arg(source)
            .arg("-q:v").arg("1")
            .arg(frame_pattern)
            .output()
            .await
    }

    async fn run_encode_frames(
        &self,
        frame_pattern: &Path,
        fps: f64,
        crf: u32,
        preset: &str,
        output: &Path,
    ) -> io::Result<Output> {
        TokioCommand::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-framerate").arg(fps.to_string())
            .arg("-i").arg(frame_pattern)
            .arg("-c:v").arg("libx264")
            .arg("-crf").arg(crf.to_string())
            .arg("-preset").arg(preset)
            .arg("-pix_fmt").arg("yuv420p")
            .arg(output)
            .output()
            .await
    }

    async fn run_mux_audio(
        &self,
        video: &Path,
        audio_source: &Path,
        output: &Path,
    ) -> io::Result<Output> {
        TokioCommand::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-i").arg(video)
            .arg("-i").arg(audio_source)
            .arg("-map").arg("0:v:0")
            .arg("-map").arg("1:a:0")
            .arg("-c").arg("copy")
            .arg("-shortest")
            .arg(output)
            .output()
            .await
    }
}
