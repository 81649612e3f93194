//! Kubrick - Single-Job Video Upscaling Worker
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (job contract, media metadata, scale, workspace)
//! - ports/: Trait definitions for the external tools
//! - adapters/: Concrete implementations (ffmpeg/ffprobe, Real-ESRGAN CLI, HTTP download)
//! - application/: The pipeline orchestrator
//! - config: Environment configuration
//!
//! One request drives one job: extract frames with the transcoder, upscale
//! them with the super-resolution tool, reassemble at the target frame rate,
//! reattach the original audio, and hand the result back inline as base64.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::pipeline::UpscaleService;
pub use config::Config;
pub use error::PipelineError;
