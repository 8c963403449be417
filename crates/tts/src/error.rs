use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = TtsError> = std::result::Result<T, E>;

/// Errors that can occur while handling a speech job
#[derive(Debug, Error)]
pub enum TtsError {
    /// Job input has no usable `text`
    #[error("Missing required field: 'text'")]
    MissingText,

    /// Requested `output_format` is not one of mp3, wav, ogg
    #[error("Unsupported output_format: '{0}'. Use mp3, wav, or ogg.")]
    UnsupportedFormat(String),

    /// Job input is not shaped like a job (wrong field types, not an object)
    #[error("Invalid job input: {0}")]
    InvalidInput(String),

    /// The speech model could not be constructed
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// The speech model failed while generating audio
    #[error("speech generation failed: {0}")]
    Generation(String),

    /// Waveform could not be written to or read from a WAV container
    #[error("audio serialization failed: {0}")]
    Audio(String),

    /// The transcoder has no encoder configured for this format
    #[error("Unsupported output format for transcoder: '{0}'")]
    UnsupportedEncoding(String),

    /// The transcoder exited unsuccessfully
    #[error("ffmpeg failed ({status}): {stderr}")]
    TranscodeFailed { status: String, stderr: String },

    /// The transcoder did not finish within its time budget and was killed
    #[error("ffmpeg timed out after {0:?}")]
    TranscodeTimeout(Duration),

    /// The transcoder process could not be started or talked to
    #[error("transcoder I/O error: {0}")]
    TranscoderIo(String),

    /// Invalid worker configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl TtsError {
    /// Whether the job itself was at fault rather than the worker
    ///
    /// Client errors are rejected before the model is touched.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingText | Self::UnsupportedFormat(_) | Self::InvalidInput(_)
        )
    }

    /// Machine-readable error type, used as a metric and log attribute
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::MissingText | Self::UnsupportedFormat(_) | Self::InvalidInput(_) => "invalid_request_error",
            Self::ModelLoad(_) => "model_load_error",
            Self::Generation(_) => "generation_error",
            Self::Audio(_) => "audio_error",
            Self::UnsupportedEncoding(_)
            | Self::TranscodeFailed { .. }
            | Self::TranscodeTimeout(_)
            | Self::TranscoderIo(_) => "transcode_error",
            Self::Config(_) => "config_error",
        }
    }
}
