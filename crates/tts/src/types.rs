use std::num::FpCategory;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::TtsError, format::AudioFormat};

/// Job envelope delivered by the host runtime
#[derive(Debug, Deserialize)]
pub struct JobRequest {
    /// Runtime-assigned job identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Handler input, validated by the worker
    #[serde(default)]
    pub input: Value,
}

/// Raw handler input, checked field by field in a fixed order
///
/// Fields are read from the JSON object directly so that a job missing its
/// text always gets the missing-text message, whatever else is wrong with it.
#[derive(Debug, Default)]
pub struct JobInput {
    fields: Map<String, Value>,
}

/// A job that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechJob {
    pub text: String,
    pub format: AudioFormat,
    pub exaggeration: Option<f32>,
    pub cfg_weight: Option<f32>,
    pub temperature: Option<f32>,
}

impl JobInput {
    /// Wrap raw handler input; `null` is treated as an empty object
    pub fn from_value(value: Value) -> crate::Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(TtsError::InvalidInput(format!("expected an object, got {other}"))),
        }
    }

    /// Check `text` first, then `output_format`, then the generation knobs
    pub fn validate(self) -> crate::Result<SpeechJob> {
        let text = self.text()?;

        let format = match self.fields.get("output_format") {
            None | Some(Value::Null) => AudioFormat::default(),
            Some(Value::String(raw)) => raw.parse()?,
            Some(other) => return Err(TtsError::UnsupportedFormat(other.to_string())),
        };

        Ok(SpeechJob {
            text,
            format,
            exaggeration: self.knob("exaggeration")?,
            cfg_weight: self.knob("cfg_weight")?,
            temperature: self.knob("temperature")?,
        })
    }

    /// Empty values of any type count as missing
    fn text(&self) -> crate::Result<String> {
        match self.fields.get("text") {
            Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
            None | Some(Value::Null | Value::Bool(false) | Value::String(_)) => Err(TtsError::MissingText),
            Some(Value::Number(n)) if n.as_f64().is_some_and(|v| v.classify() == FpCategory::Zero) => {
                Err(TtsError::MissingText)
            }
            Some(Value::Array(items)) if items.is_empty() => Err(TtsError::MissingText),
            Some(Value::Object(map)) if map.is_empty() => Err(TtsError::MissingText),
            Some(other) => Err(TtsError::InvalidInput(format!("'text' must be a string, got {other}"))),
        }
    }

    fn knob(&self, name: &str) -> crate::Result<Option<f32>> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| TtsError::InvalidInput(format!("'{name}': {e}"))),
        }
    }
}

/// Handler output: either encoded audio or an error message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResponse {
    Audio { audio_base64: String, format: AudioFormat },
    Error { error: String },
}

impl JobResponse {
    pub fn error(err: &TtsError) -> Self {
        Self::Error { error: err.to_string() }
    }
}

/// Terminal state reported back to the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Handler ran to completion; the output may still be a validation error
    Completed,
    /// Worker-side failure (model, audio, transcoder)
    Failed,
}

/// Job envelope returned to the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub id: String,
    pub status: JobStatus,
    pub output: JobResponse,
}
