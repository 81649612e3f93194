use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command as TokioCommand;

use crate::config::Config;
use crate::ports::upscaler::FrameUpscaler;

/// Drives a Real-ESRGAN ncnn CLI in directory-batch mode.
pub struct RealEsrganUpscaler {
    bin: String,
    weights_dir: Option<PathBuf>,
}

impl RealEsrganUpscaler {
    pub fn new(config: &Config) -> Self {
        Self {
            bin: config.upscaler_bin.clone(),
            weights_dir: config.weights_dir.clone(),
        }
    }
}

#[async_trait]
impl FrameUpscaler for RealEsrganUpscaler {
    async fn run_upscale(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        model: &str,
        factor: f64,
    ) -> io::Result<Output> {
        let mut command = TokioCommand::new(&self.bin);
        command
            .arg("-i").arg(input_dir)
            .arg("-o").arg(output_dir)
            .arg("-n").arg(model)
            .arg("-s").arg(format_factor(factor));
        if let Some(dir) = &self.weights_dir {
            command.arg("-m").arg(dir);
        }
        command.output().await
    }
}

// "2" rather than "2.0" for whole factors; the tool's -s flag is picky.
fn format_factor(factor: f64) -> String {
    if factor.fract() == 0.0 {
        format!("{}", factor as i64)
    } else {
        format!("{}", factor)
    }
}
