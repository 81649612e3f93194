use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::Semaphore;
use tracing::info;

use kubrick::adapters::ffmpeg::FfmpegTranscoder;
use kubrick::adapters::http::HttpFetcher;
use kubrick::adapters::realesrgan::RealEsrganUpscaler;
use kubrick::application::pipeline::UpscaleService;
use kubrick::config::Config;
use kubrick::domain::job::{JobRequest, JobResult};
use kubrick::error::PipelineError;

type LiveService = UpscaleService<HttpFetcher, FfmpegTranscoder, RealEsrganUpscaler>;

#[derive(Clone)]
struct AppState {
    service: Arc<LiveService>,
    jobs: Arc<Semaphore>,
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::fmt::init();

    let service = Arc::new(UpscaleService::new(
        HttpFetcher::new(),
        FfmpegTranscoder::new(&config),
        RealEsrganUpscaler::new(&config),
        config.clone(),
    ));

    let state = AppState {
        service,
        jobs: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
    };

    let app = Router::new()
        .route("/", get(health))
        .route("/run", post(run_job))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    info!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}

async fn health() -> &'static str {
    "ok"
}

/// One job per request. The caller always gets one of the two result shapes
/// back, never a framework error, malformed JSON included.
async fn run_job(State(state): State<AppState>, body: String) -> Json<JobResult> {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(e) => return Json(JobResult::failure(e)),
    };

    let _permit = match state.jobs.clone().acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => return Json(JobResult::failure(PipelineError::Internal(e.to_string()))),
    };

    Json(state.service.run(&request).await)
}

fn parse_request(body: &str) -> Result<JobRequest, PipelineError> {
    let payload: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| PipelineError::InvalidRequest(format!("request is not valid JSON: {}", e)))?;
    serde_json::from_value(job_input(payload))
        .map_err(|e| PipelineError::InvalidRequest(e.to_string()))
}

/// Accept both the serverless envelope `{"input": {...}}` and a flat object.
fn job_input(payload: serde_json::Value) -> serde_json::Value {
    match payload.get("input") {
        Some(input) if input.is_object() => input.clone(),
        _ => payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_input_unwraps_envelope() {
        let payload = json!({"input": {"video_url": "https://example.com/a.mp4"}});
        let input = job_input(payload);
        assert_eq!(input["video_url"], "https://example.com/a.mp4");
    }

    #[test]
    fn test_job_input_accepts_flat_object() {
        let payload = json!({"video_url": "https://example.com/a.mp4", "scale": 2.0});
        let input = job_input(payload);
        assert_eq!(input["video_url"], "https://example.com/a.mp4");
        assert_eq!(input["scale"], 2.0);
    }

    #[test]
    fn test_job_input_ignores_non_object_input_field() {
        let payload = json!({"input": null, "video_url": "https://example.com/a.mp4"});
        let input = job_input(payload);
        assert_eq!(input["video_url"], "https://example.com/a.mp4");
    }

    #[test]
    fn test_envelope_deserializes_into_request() {
        let request =
            parse_request(r#"{"input": {"file_path": "/data/in.mp4", "crf": 18}}"#).unwrap();
        assert_eq!(request.local_path(), Some("/data/in.mp4"));
        assert_eq!(request.crf_or_default(), 18);
    }

    #[test]
    fn test_invalid_json_is_invalid_request() {
        let err = parse_request("not json {").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest(_)));
    }

    #[test]
    fn test_wrongly_typed_field_is_invalid_request() {
        let err = parse_request(r#"{"scale": "two"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest(_)));
    }
}
