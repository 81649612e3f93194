use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Output;

/// Contract with the external super-resolution tool.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait FrameUpscaler: Send + Sync {
    /// Upscale every frame in `input_dir` into `output_dir` by `factor`
    /// using `model`, preserving frame file names.
    async fn run_upscale(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        model: &str,
        factor: f64,
    ) -> io::Result<Output>;
}
