//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Every recognized environment option, captured once at startup and passed
/// into the pipeline. Stages never read the environment mid-job.
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Parent directory for per-job workspaces
    pub work_dir: PathBuf,
    /// ffmpeg binary
    pub ffmpeg_bin: String,
    /// ffprobe binary
    pub ffprobe_bin: String,
    /// Super-resolution tool binary
    pub upscaler_bin: String,
    /// Model identifier used when the request does not name one
    pub default_model: String,
    /// Model weights directory handed to the upscaler, if set
    pub weights_dir: Option<PathBuf>,
    /// Wall-clock bound for each external tool invocation
    pub tool_timeout: Duration,
    /// In-flight job bound for this worker
    pub max_concurrent_jobs: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            work_dir: env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| String::from("ffmpeg")),
            ffprobe_bin: env::var("FFPROBE_BIN").unwrap_or_else(|_| String::from("ffprobe")),
            upscaler_bin: env::var("REAL_ESRGAN_BIN")
                .unwrap_or_else(|_| String::from("realesrgan-ncnn-vulkan")),
            default_model: env::var("REAL_ESRGAN_MODEL")
                .unwrap_or_else(|_| String::from("realesr-animevideov3")),
            weights_dir: env::var("WEIGHTS_DIR").ok().map(PathBuf::from),
            tool_timeout: Duration::from_secs(
                env::var("TOOL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(900),
            ),
            max_concurrent_jobs: env::var("MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }
}
