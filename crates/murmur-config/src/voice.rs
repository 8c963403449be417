use std::path::PathBuf;

use serde::Deserialize;

/// Built-in location of the voice reference sample
pub const DEFAULT_VOICE_REF_PATH: &str = "/app/voices/spectre-primary.wav";

/// Voice conditioning configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceConfig {
    /// Reference sample used to condition the voice when the file exists
    #[serde(default = "default_reference_path")]
    pub reference_path: PathBuf,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            reference_path: default_reference_path(),
        }
    }
}

fn default_reference_path() -> PathBuf {
    PathBuf::from(DEFAULT_VOICE_REF_PATH)
}
