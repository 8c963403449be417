use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use base64::Engine;
use murmur_config::ModelConfig;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{GenerationParams, ModelLoader, SpeechModel};
use crate::{error::TtsError, http_client::http_client, wav};

#[derive(Clone)]
struct Endpoint {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl Endpoint {
    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}/{path}", self.base_url));

        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key.expose_secret())),
            None => request,
        }
    }
}

/// Loads the model by asking the inference sidecar to bring it up on the
/// configured device
///
/// `POST /load` places the weights and reports the output sample rate;
/// `POST /generate` returns a WAV body for one utterance.
pub struct RemoteModelLoader {
    endpoint: Endpoint,
    device: String,
}

impl RemoteModelLoader {
    pub fn new(config: &ModelConfig) -> crate::Result<Self> {
        let timeout = config
            .timeout_duration()
            .map_err(|e| TtsError::Config(e.to_string()))?;
        let client = http_client(timeout).map_err(|e| TtsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: Endpoint {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
            },
            device: config.device.clone(),
        })
    }
}

#[derive(Serialize)]
struct LoadRequest<'a> {
    device: &'a str,
}

#[derive(Deserialize)]
struct LoadResponse {
    sample_rate: u32,
}

#[async_trait]
impl ModelLoader for RemoteModelLoader {
    async fn load(&self) -> crate::Result<Arc<dyn SpeechModel>> {
        tracing::debug!(base_url = %self.endpoint.base_url, device = %self.device, "requesting model load");

        let response = self
            .endpoint
            .post("load")
            .json(&LoadRequest { device: &self.device })
            .send()
            .await
            .map_err(|e| TtsError::ModelLoad(format!("failed to reach model backend: {e}")))?;

        let response = check_status(response).await.map_err(TtsError::ModelLoad)?;

        let LoadResponse { sample_rate } = response
            .json()
            .await
            .map_err(|e| TtsError::ModelLoad(format!("malformed load response: {e}")))?;

        if sample_rate == 0 {
            return Err(TtsError::ModelLoad("model backend reported a zero sample rate".to_string()));
        }

        Ok(Arc::new(RemoteModel {
            endpoint: self.endpoint.clone(),
            sample_rate,
        }))
    }
}

/// Handle to a model loaded in the sidecar
struct RemoteModel {
    endpoint: Endpoint,
    sample_rate: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    exaggeration: f32,
    cfg_weight: f32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_prompt: Option<String>,
}

#[async_trait]
impl SpeechModel for RemoteModel {
    async fn generate(&self, params: &GenerationParams) -> crate::Result<wav::Waveform> {
        let audio_prompt = match &params.audio_prompt_path {
            Some(path) => read_prompt(path).await,
            None => None,
        };

        tracing::debug!(
            input_len = params.text.len(),
            conditioned = audio_prompt.is_some(),
            "remote generate request"
        );

        let body = GenerateRequest {
            text: &params.text,
            exaggeration: params.exaggeration,
            cfg_weight: params.cfg_weight,
            temperature: params.temperature,
            audio_prompt,
        };

        let response = self
            .endpoint
            .post("generate")
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::Generation(format!("failed to reach model backend: {e}")))?;

        let response = check_status(response).await.map_err(TtsError::Generation)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TtsError::Generation(format!("failed to read generated audio: {e}")))?;

        let waveform = wav::decode(&bytes)?;

        if waveform.sample_rate != self.sample_rate {
            tracing::warn!(
                expected = self.sample_rate,
                actual = waveform.sample_rate,
                "model backend returned an unexpected sample rate"
            );
        }

        Ok(waveform)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Base64 content of the reference sample; unreadable files disable conditioning
async fn read_prompt(path: &Path) -> Option<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
        Err(e) => {
            tracing::warn!(path = %path.display(), "voice reference unreadable, generating without it: {e}");
            None
        }
    }
}

async fn check_status(response: Response) -> Result<Response, String> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    tracing::error!("model backend error ({status}): {error_text}");

    Err(format!("model backend returned {status}: {error_text}"))
}
