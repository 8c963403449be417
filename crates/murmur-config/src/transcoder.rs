use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// External transcoder configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscoderConfig {
    /// Path or name of the ffmpeg executable
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Upper bound on a single transcode (e.g. "60s")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout: default_timeout(),
        }
    }
}

impl TranscoderConfig {
    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a valid duration string
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid transcoder timeout '{}': {e}", self.timeout))
    }
}

fn default_program() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout() -> String {
    "60s".to_string()
}
