pub mod remote;

use std::{path::PathBuf, sync::Arc, time::Instant};

use async_trait::async_trait;
use murmur_config::InitPolicy;
use murmur_telemetry::metrics::{JobMetrics, record_duration};
use tokio::sync::OnceCell;

use crate::wav::Waveform;

/// Inputs to a single generate call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub text: String,
    pub exaggeration: f32,
    pub cfg_weight: f32,
    pub temperature: f32,
    /// Reference sample to condition the voice on, when one exists
    pub audio_prompt_path: Option<PathBuf>,
}

/// A loaded text-to-speech model
///
/// Shared read-only across jobs. Implementations must tolerate concurrent
/// `generate` calls.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Synthesize speech for the given parameters
    async fn generate(&self, params: &GenerationParams) -> crate::Result<Waveform>;

    /// Native output sample rate
    fn sample_rate(&self) -> u32;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Constructs a [`SpeechModel`] (weights, device placement)
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> crate::Result<Arc<dyn SpeechModel>>;
}

/// Owns the process-wide model handle
///
/// The handle is created at most once: concurrent first callers wait on a
/// single load, and a failed load leaves the cell empty so the next caller
/// tries again.
pub struct ModelManager {
    loader: Box<dyn ModelLoader>,
    policy: InitPolicy,
    model: OnceCell<Arc<dyn SpeechModel>>,
    metrics: JobMetrics,
}

impl ModelManager {
    pub fn new(loader: Box<dyn ModelLoader>, policy: InitPolicy) -> Self {
        Self {
            loader,
            policy,
            model: OnceCell::new(),
            metrics: JobMetrics::new(),
        }
    }

    pub const fn policy(&self) -> InitPolicy {
        self.policy
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Load the model now if the policy is eager; no-op when lazy
    pub async fn prepare(&self) -> crate::Result<()> {
        match self.policy {
            InitPolicy::Eager => self.get_model().await.map(|_| ()),
            InitPolicy::Lazy => {
                tracing::info!("model load deferred until first job");
                Ok(())
            }
        }
    }

    /// Return the shared model, loading it if this is the first use
    pub async fn get_model(&self) -> crate::Result<Arc<dyn SpeechModel>> {
        self.model.get_or_try_init(|| self.load()).await.cloned()
    }

    async fn load(&self) -> crate::Result<Arc<dyn SpeechModel>> {
        tracing::info!(policy = ?self.policy, "loading speech model");
        let start = Instant::now();

        let model = self.loader.load().await.inspect_err(|e| {
            tracing::error!("speech model load failed: {e}");
        })?;

        record_duration(&self.metrics.model_load_duration, start, &[]);
        tracing::info!(
            backend = model.name(),
            sample_rate = model.sample_rate(),
            elapsed_ms = start.elapsed().as_millis(),
            "speech model loaded"
        );

        Ok(model)
    }
}
