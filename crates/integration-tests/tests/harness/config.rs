//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use murmur_config::{Config, InitPolicy};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder pointed at a model backend
    ///
    /// The voice reference and transcoder default to paths that do not exist.
    pub fn new(model_url: &str) -> Self {
        let mut config = Config::default();

        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.model.base_url = model_url.parse().expect("valid URL");
        config.model.timeout = "5s".to_owned();
        config.voice.reference_path = "/nonexistent/voices/reference.wav".into();
        config.transcoder.program = "/nonexistent/bin/ffmpeg".into();

        Self { config }
    }

    /// Set the model init policy
    pub fn with_init(mut self, init: InitPolicy) -> Self {
        self.config.model.init = init;
        self
    }

    /// Set the voice reference sample path
    pub fn with_voice(mut self, path: &Path) -> Self {
        self.config.voice.reference_path = path.to_path_buf();
        self
    }

    /// Set the transcoder program and timeout
    pub fn with_transcoder(mut self, program: &Path, timeout: &str) -> Self {
        self.config.transcoder.program = program.to_path_buf();
        self.config.transcoder.timeout = timeout.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
