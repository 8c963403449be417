use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error on unparsable durations, non-finite generation
    /// defaults, or a malformed health path
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_timeouts()?;
        self.validate_generation()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_timeouts(&self) -> anyhow::Result<()> {
        if self.model.timeout_duration()?.is_zero() {
            anyhow::bail!("model.timeout must be greater than 0");
        }

        if self.transcoder.timeout_duration()?.is_zero() {
            anyhow::bail!("transcoder.timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_generation(&self) -> anyhow::Result<()> {
        let defaults = &self.generation;

        for (name, value) in [
            ("exaggeration", defaults.exaggeration),
            ("cfg_weight", defaults.cfg_weight),
            ("temperature", defaults.temperature),
        ] {
            if !value.is_finite() {
                anyhow::bail!("generation.{name} must be a finite number");
            }
        }

        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        if let Some(rate) = self
            .telemetry
            .as_ref()
            .and_then(|t| t.tracing.as_ref())
            .map(|t| t.sampling_rate)
            && !(0.0..=1.0).contains(&rate)
        {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}
