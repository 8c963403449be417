use std::{sync::Arc, time::Instant};

use base64::Engine;
use murmur_config::{GenerationDefaults, ModelBackendType};
use murmur_telemetry::{
    KeyValue,
    metrics::{JobMetrics, record_duration},
};
use serde_json::Value;
use tracing::Instrument;

use crate::{
    error::TtsError,
    format::AudioFormat,
    model::{GenerationParams, ModelLoader, ModelManager, remote::RemoteModelLoader},
    transcoder::{self, FfmpegTranscoder, Transcoder},
    types::{JobInput, JobRequest, JobResponse, JobResult, JobStatus},
    voice::VoiceReference,
    wav,
};

/// Encoded audio for one job
#[derive(Debug)]
struct SpeechOutput {
    audio: Vec<u8>,
    format: AudioFormat,
}

/// Speech job handler
///
/// Validates job input, runs the shared model, serializes the waveform and
/// hands it to the transcoder. Every failure comes back as a `{error}`
/// response; nothing escapes as a panic or an unhandled error.
pub struct Worker {
    models: Arc<ModelManager>,
    transcoder: Arc<dyn Transcoder>,
    voice: VoiceReference,
    defaults: GenerationDefaults,
    metrics: JobMetrics,
}

impl Worker {
    pub fn new(
        models: Arc<ModelManager>,
        transcoder: Arc<dyn Transcoder>,
        voice: VoiceReference,
        defaults: GenerationDefaults,
    ) -> Self {
        Self {
            models,
            transcoder,
            voice,
            defaults,
            metrics: JobMetrics::new(),
        }
    }

    pub const fn models(&self) -> &Arc<ModelManager> {
        &self.models
    }

    /// Get the worker ready to accept jobs
    ///
    /// Loads the model under the eager policy, so a load failure here
    /// should abort startup.
    pub async fn prepare(&self) -> crate::Result<()> {
        match self.voice.resolve().await {
            Some(path) => tracing::info!(path = %path.display(), "voice reference found"),
            None => tracing::info!(
                path = %self.voice.path().display(),
                "no voice reference, using built-in voice"
            ),
        }

        self.models.prepare().await
    }

    /// Run one job envelope and report its terminal status
    pub async fn run(&self, request: JobRequest) -> JobResult {
        let id = request.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let span = tracing::info_span!("job", job_id = %id);

        let (status, output) = self.execute(request.input).instrument(span).await;

        JobResult { id, status, output }
    }

    /// Handle raw job input, returning the response payload only
    pub async fn handle(&self, input: Value) -> JobResponse {
        self.execute(input).await.1
    }

    async fn execute(&self, input: Value) -> (JobStatus, JobResponse) {
        let start = Instant::now();

        let (status, response, outcome) = match self.synthesize(input).await {
            Ok(output) => {
                tracing::info!(
                    format = %output.format,
                    audio_bytes = output.audio.len(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "job complete"
                );

                let response = JobResponse::Audio {
                    audio_base64: base64::engine::general_purpose::STANDARD.encode(&output.audio),
                    format: output.format,
                };
                (JobStatus::Completed, response, "success")
            }
            Err(e) if e.is_client_error() => {
                tracing::warn!("job rejected: {e}");
                (JobStatus::Completed, JobResponse::error(&e), "rejected")
            }
            Err(e) => {
                tracing::error!(error_type = e.error_type(), "job failed: {e}");
                (JobStatus::Failed, JobResponse::error(&e), "failed")
            }
        };

        let attributes = [KeyValue::new("outcome", outcome)];
        self.metrics.jobs.add(1, &attributes);
        record_duration(&self.metrics.job_duration, start, &attributes);

        (status, response)
    }

    async fn synthesize(&self, input: Value) -> crate::Result<SpeechOutput> {
        let job = JobInput::from_value(input)?.validate()?;

        let model = self.models.get_model().await?;

        let params = GenerationParams {
            text: job.text,
            exaggeration: job.exaggeration.unwrap_or(self.defaults.exaggeration),
            cfg_weight: job.cfg_weight.unwrap_or(self.defaults.cfg_weight),
            temperature: job.temperature.unwrap_or(self.defaults.temperature),
            audio_prompt_path: self.voice.resolve().await,
        };

        tracing::debug!(
            input_len = params.text.len(),
            format = %job.format,
            exaggeration = params.exaggeration,
            cfg_weight = params.cfg_weight,
            temperature = params.temperature,
            conditioned = params.audio_prompt_path.is_some(),
            "generating speech"
        );

        let waveform = model.generate(&params).await?;
        tracing::debug!(
            samples = waveform.samples.len(),
            duration_secs = waveform.duration_secs(),
            "speech generated"
        );

        let wav_bytes = wav::encode(&waveform)?;

        let transcode_start = Instant::now();
        let audio = transcoder::convert(self.transcoder.as_ref(), wav_bytes, job.format).await?;
        if job.format != AudioFormat::Wav {
            record_duration(
                &self.metrics.transcode_duration,
                transcode_start,
                &[KeyValue::new("format", job.format.as_str())],
            );
        }

        Ok(SpeechOutput {
            audio,
            format: job.format,
        })
    }
}

/// Builder for constructing the worker from configuration
pub struct WorkerBuilder<'a> {
    config: &'a murmur_config::Config,
}

impl<'a> WorkerBuilder<'a> {
    pub const fn new(config: &'a murmur_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> crate::Result<Worker> {
        let model_config = &self.config.model;

        let loader: Box<dyn ModelLoader> = match model_config.backend {
            ModelBackendType::Remote => {
                tracing::debug!(base_url = %model_config.base_url, "using remote model backend");
                Box::new(RemoteModelLoader::new(model_config)?)
            }
        };

        let models = Arc::new(ModelManager::new(loader, model_config.init));

        let transcoder_config = &self.config.transcoder;
        let timeout = transcoder_config
            .timeout_duration()
            .map_err(|e| TtsError::Config(e.to_string()))?;
        let transcoder = Arc::new(FfmpegTranscoder::new(transcoder_config.program.clone(), timeout));

        tracing::debug!(
            init = ?model_config.init,
            transcoder = %transcoder.program().display(),
            "worker initialized"
        );

        Ok(Worker::new(
            models,
            transcoder,
            VoiceReference::new(self.config.voice.reference_path.clone()),
            self.config.generation,
        ))
    }
}
