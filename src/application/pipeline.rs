use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;

use tracing::{error, info};

use crate::config::Config;
use crate::domain::job::{JobParams, JobRequest, JobResult};
use crate::domain::media::MediaMetadata;
use crate::domain::scale::ResolvedScale;
use crate::domain::workspace::{list_frames, Workspace};
use crate::error::{stderr_tail, PipelineError};
use crate::ports::fetcher::VideoFetcher;
use crate::ports::transcoder::MediaTranscoder;
use crate::ports::upscaler::FrameUpscaler;

/// Single-job upscaling pipeline over the three tool ports.
///
/// Stages run strictly in sequence: source -> probe -> scale -> extract ->
/// upscale -> reassemble -> result. Any stage failure aborts the job; the
/// workspace is torn down on every path by its drop guard.
pub struct UpscaleService<F, T, U> {
    fetcher: F,
    transcoder: T,
    upscaler: U,
    config: Config,
}

impl<F, T, U> UpscaleService<F, T, U>
where
    F: VideoFetcher,
    T: MediaTranscoder,
    U: FrameUpscaler,
{
    pub fn new(fetcher: F, transcoder: T, upscaler: U, config: Config) -> Self {
        Self {
            fetcher,
            transcoder,
            upscaler,
            config,
        }
    }

    /// Run one job to completion. Always returns exactly one of the two
    /// result shapes; no workspace outlives this call.
    pub async fn run(&self, request: &JobRequest) -> JobResult {
        match self.execute(request).await {
            Ok(result) => result,
            Err(err) => {
                error!("job failed: {}", err);
                JobResult::failure(err)
            }
        }
    }

    async fn execute(&self, request: &JobRequest) -> Result<JobResult, PipelineError> {
        let workspace = Workspace::create(&self.config.work_dir)
            .map_err(|e| PipelineError::Internal(format!("workspace creation failed: {}", e)))?;
        info!("job {} started in {:?}", workspace.job_id, workspace.path());

        // 1. Source
        let source = self.resolve_source(request, &workspace).await?;

        // 2. Probe
        let meta = self.probe(&source).await?;

        // 3. Scale
        let scale =
            ResolvedScale::resolve(request.scale, request.target_resolution.as_deref(), &meta)?;
        info!(
            "job {}: {}x{} @ {:.3} fps, scaling x{} to {}x{}",
            workspace.job_id, meta.width, meta.height, meta.fps, scale.factor, scale.width,
            scale.height
        );

        // 4. Extract frames
        let frame_count = self.extract_frames(&source, &workspace).await?;

        // 5. Upscale frames
        let model = request.model_or(&self.config.default_model).to_string();
        self.upscale_frames(&workspace, frame_count, &model, scale.factor)
            .await?;

        // 6. Reassemble
        let fps = match request.output_fps {
            Some(f) if f > 0.0 => f,
            _ => meta.fps,
        };
        let crf = request.crf_or_default();
        let preset = request.preset_or_default().to_string();
        let artifact = self
            .reassemble(&workspace, &source, &meta, fps, crf, &preset)
            .await?;

        // 7. Result
        let bytes = tokio::fs::read(&artifact)
            .await
            .map_err(|e| PipelineError::Internal(format!("reading output artifact: {}", e)))?;
        info!("job {} finished, {} bytes", workspace.job_id, bytes.len());

        Ok(JobResult::success(
            &bytes,
            JobParams {
                scale: scale.factor,
                model,
                target_resolution: request.target_resolution.clone(),
                crf,
                preset,
                output_fps: fps,
            },
        ))
    }

    /// Materialize the source inside the workspace: download the URL when one
    /// is given (URL wins over a local path), else copy the local file in.
    async fn resolve_source(
        &self,
        request: &JobRequest,
        workspace: &Workspace,
    ) -> Result<PathBuf, PipelineError> {
        let dest = workspace.source_path();

        if let Some(url) = request.url() {
            self.fetcher
                .fetch(url, &dest)
                .await
                .map_err(|e| PipelineError::Download(e.to_string()))?;
            let size = tokio::fs::metadata(&dest).await.map(|m| m.len()).unwrap_or(0);
            if size == 0 {
                return Err(PipelineError::Download(format!("{} produced no data", url)));
            }
            return Ok(dest);
        }

        if let Some(path) = request.local_path() {
            let meta = tokio::fs::metadata(path)
                .await
                .map_err(|_| PipelineError::InputNotFound(path.to_string()))?;
            if !meta.is_file() || meta.len() == 0 {
                return Err(PipelineError::InputNotFound(format!(
                    "{} is empty or not a file",
                    path
                )));
            }
            tokio::fs::copy(path, &dest)
                .await
                .map_err(|e| PipelineError::Internal(format!("copying source into workspace: {}", e)))?;
            return Ok(dest);
        }

        Err(PipelineError::InvalidRequest(String::from(
            "provide either 'video_url' or 'file_path'",
        )))
    }

    async fn probe(&self, source: &Path) -> Result<MediaMetadata, PipelineError> {
        let output = self
            .bounded("ffprobe", self.transcoder.run_probe(source))
            .await
            .map_err(PipelineError::Probe)?;
        if !output.status.success() {
            return Err(PipelineError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr_tail(&output.stderr)
            )));
        }
        MediaMetadata::from_probe_output(&output.stdout)
    }

    async fn extract_frames(
        &self,
        source: &Path,
        workspace: &Workspace,
    ) -> Result<usize, PipelineError> {
        let output = self
            .bounded(
                "ffmpeg",
                self.transcoder
                    .run_extract_frames(source, &workspace.frame_pattern()),
            )
            .await
            .map_err(PipelineError::Extraction)?;
        if !output.status.success() {
            return Err(PipelineError::Extraction(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr_tail(&output.stderr)
            )));
        }

        let frames = list_frames(&workspace.frames_dir())
            .map_err(|e| PipelineError::Extraction(format!("listing frames: {}", e)))?;
        if frames.is_empty() {
            return Err(PipelineError::Extraction(String::from(
                "ffmpeg produced no frames",
            )));
        }
        info!("job {}: extracted {} frames", workspace.job_id, frames.len());
        Ok(frames.len())
    }

    /// Batch-upscale the frame sequence, then enforce the count invariant:
    /// the upscaled sequence must match the extracted one exactly.
    async fn upscale_frames(
        &self,
        workspace: &Workspace,
        expected: usize,
        model: &str,
        factor: f64,
    ) -> Result<(), PipelineError> {
        let output = self
            .bounded(
                "upscaler",
                self.upscaler.run_upscale(
                    &workspace.frames_dir(),
                    &workspace.upscaled_dir(),
                    model,
                    factor,
                ),
            )
            .await
            .map_err(PipelineError::Upscale)?;
        if !output.status.success() {
            return Err(PipelineError::Upscale(format!(
                "tool exited with {} (model '{}'): {}",
                output.status,
                model,
                stderr_tail(&output.stderr)
            )));
        }

        let upscaled = list_frames(&workspace.upscaled_dir())
            .map_err(|e| PipelineError::Upscale(format!("listing upscaled frames: {}", e)))?;
        if upscaled.len() != expected {
            return Err(PipelineError::Upscale(format!(
                "tool ran but produced {} frames, expected {}",
                upscaled.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Encode the upscaled frames at the resolved fps, then mux the source's
    /// audio back in. Sources without audio ship the video-only file.
    async fn reassemble(
        &self,
        workspace: &Workspace,
        source: &Path,
        meta: &MediaMetadata,
        fps: f64,
        crf: u32,
        preset: &str,
    ) -> Result<PathBuf, PipelineError> {
        let video_only = workspace.video_only_path();
        let output = self
            .bounded(
                "ffmpeg",
                self.transcoder.run_encode_frames(
                    &workspace.upscaled_pattern(),
                    fps,
                    crf,
                    preset,
                    &video_only,
                ),
            )
            .await
            .map_err(PipelineError::Reassembly)?;
        if !output.status.success() {
            return Err(PipelineError::Reassembly(format!(
                "encoding frames: ffmpeg exited with {}: {}",
                output.status,
                stderr_tail(&output.stderr)
            )));
        }

        let final_path = if meta.has_audio {
            let muxed = workspace.output_path();
            let output = self
                .bounded(
                    "ffmpeg",
                    self.transcoder.run_mux_audio(&video_only, source, &muxed),
                )
                .await
                .map_err(PipelineError::Reassembly)?;
            if !output.status.success() {
                return Err(PipelineError::Reassembly(format!(
                    "muxing audio: ffmpeg exited with {}: {}",
                    output.status,
                    stderr_tail(&output.stderr)
                )));
            }
            muxed
        } else {
            info!(
                "job {}: source has no audio stream, shipping video-only output",
                workspace.job_id
            );
            video_only
        };

        let size = tokio::fs::metadata(&final_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if size == 0 {
            return Err(PipelineError::Reassembly(String::from(
                "output video is empty",
            )));
        }
        Ok(final_path)
    }

    /// Bound a tool invocation by the configured wall-clock timeout and turn
    /// launch failures into a message. A missing binary reads differently
    /// from a tool that ran and failed.
    async fn bounded<Fut>(&self, tool: &str, fut: Fut) -> Result<Output, String>
    where
        Fut: Future<Output = io::Result<Output>>,
    {
        match tokio::time::timeout(self.config.tool_timeout, fut).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => Err(format!(
                "{} not found (is it installed and on PATH?)",
                tool
            )),
            Ok(Err(e)) => Err(format!("failed to run {}: {}", tool, e)),
            Err(_) => Err(format!(
                "{} timed out after {}s",
                tool,
                self.config.tool_timeout.as_secs()
            )),
        }
    }
}
