#![allow(clippy::must_use_candidate)]

mod env;
pub mod generation;
pub mod health;
mod loader;
pub mod model;
pub mod server;
pub mod telemetry;
pub mod transcoder;
pub mod voice;

use serde::Deserialize;

pub use generation::*;
pub use health::*;
pub use model::*;
pub use server::*;
pub use telemetry::TelemetryConfig;
pub use transcoder::*;
pub use voice::*;

/// Top-level worker configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Job server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Speech model backend configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Defaults for optional generation parameters
    #[serde(default)]
    pub generation: GenerationDefaults,
    /// Voice conditioning configuration
    #[serde(default)]
    pub voice: VoiceConfig,
    /// External audio transcoder configuration
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
