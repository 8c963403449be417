#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod format;
mod http_client;
mod model;
mod request;
mod server;
#[cfg(test)]
mod testing;
mod transcoder;
mod types;
mod voice;
pub mod wav;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

pub use error::{Result, TtsError};
pub use format::AudioFormat;
pub use model::{GenerationParams, ModelLoader, ModelManager, SpeechModel, remote::RemoteModelLoader};
pub use server::{Worker, WorkerBuilder};
pub use transcoder::{FfmpegTranscoder, Transcoder, convert};
pub use types::{JobInput, JobRequest, JobResponse, JobResult, JobStatus, SpeechJob};
pub use voice::VoiceReference;
use request::ExtractPayload;

/// Build the job worker from configuration
pub fn build_worker(config: &murmur_config::Config) -> anyhow::Result<Arc<Worker>> {
    let worker = Arc::new(
        WorkerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize worker: {e}"))?,
    );
    Ok(worker)
}

/// Create the endpoint router for job submission
pub fn endpoint_router() -> Router<Arc<Worker>> {
    Router::new().route("/runsync", post(run_job))
}

/// Run one job synchronously and return its envelope
async fn run_job(State(worker): State<Arc<Worker>>, ExtractPayload(request): ExtractPayload<JobRequest>) -> Json<JobResult> {
    tracing::debug!("runsync handler called");

    Json(worker.run(request).await)
}
