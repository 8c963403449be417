use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    error::TtsError,
    format::AudioFormat,
    model::{GenerationParams, ModelLoader, SpeechModel},
    transcoder::Transcoder,
    wav::Waveform,
};

pub const SAMPLE_RATE: u32 = 24_000;

/// Model that returns a fixed waveform and remembers what it was asked
pub struct FixedModel {
    waveform: Waveform,
    calls: AtomicUsize,
    last: Mutex<Option<GenerationParams>>,
}

impl FixedModel {
    pub fn new() -> Self {
        Self::with_samples(vec![0.0, 0.5, -0.5, 0.25, -0.125])
    }

    pub fn with_samples(samples: Vec<f32>) -> Self {
        Self {
            waveform: Waveform::new(samples, SAMPLE_RATE),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechModel for FixedModel {
    async fn generate(&self, params: &GenerationParams) -> crate::Result<Waveform> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(params.clone());
        Ok(self.waveform.clone())
    }

    fn sample_rate(&self) -> u32 {
        self.waveform.sample_rate
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Model whose every generate call fails
pub struct BrokenModel;

#[async_trait]
impl SpeechModel for BrokenModel {
    async fn generate(&self, _params: &GenerationParams) -> crate::Result<Waveform> {
        Err(TtsError::Generation("CUDA out of memory".to_string()))
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Loader that counts loads and can fail or stall on request
pub struct CountingLoader {
    model: Arc<dyn SpeechModel>,
    loads: Arc<AtomicUsize>,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::serving(Arc::new(FixedModel::new()))
    }

    pub fn serving(model: Arc<dyn SpeechModel>) -> Self {
        Self {
            model,
            loads: Arc::new(AtomicUsize::new(0)),
            failures_left: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn failing_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn loads(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }
}

#[async_trait]
impl ModelLoader for CountingLoader {
    async fn load(&self) -> crate::Result<Arc<dyn SpeechModel>> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TtsError::ModelLoad("weights not found".to_string()));
        }

        Ok(Arc::clone(&self.model))
    }
}

/// Transcoder that tags its input instead of spawning anything
#[derive(Default)]
pub struct RecordingTranscoder {
    calls: Mutex<Vec<AudioFormat>>,
}

impl RecordingTranscoder {
    pub fn calls(&self) -> Vec<AudioFormat> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn encode(&self, _wav: Vec<u8>, format: AudioFormat) -> crate::Result<Vec<u8>> {
        self.calls.lock().unwrap().push(format);
        Ok(format!("encoded-{format}").into_bytes())
    }
}

/// Transcoder that always fails like a misconfigured ffmpeg
pub struct FailingTranscoder;

#[async_trait]
impl Transcoder for FailingTranscoder {
    async fn encode(&self, _wav: Vec<u8>, _format: AudioFormat) -> crate::Result<Vec<u8>> {
        Err(TtsError::TranscodeFailed {
            status: "exit status: 1".to_string(),
            stderr: "Unknown encoder 'libopus'".to_string(),
        })
    }
}
