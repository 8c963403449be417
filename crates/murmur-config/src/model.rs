use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Speech model backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Backend type
    #[serde(rename = "type", default)]
    pub backend: ModelBackendType,
    /// Base URL of the inference sidecar hosting the pretrained weights
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token for the inference sidecar
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Device the weights are placed on (e.g. "cuda", "cpu")
    #[serde(default = "default_device")]
    pub device: String,
    /// Per-call timeout for load and generate (e.g. "300s", "5m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// When the model is loaded
    #[serde(default)]
    pub init: InitPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackendType::default(),
            base_url: default_base_url(),
            api_key: None,
            device: default_device(),
            timeout: default_timeout(),
            init: InitPolicy::default(),
        }
    }
}

impl ModelConfig {
    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a valid duration string
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid model timeout '{}': {e}", self.timeout))
    }
}

/// Supported model backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackendType {
    /// HTTP inference sidecar
    #[default]
    Remote,
}

/// Model initialization policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPolicy {
    /// Load during startup, before any job is accepted; failure aborts startup
    #[default]
    Eager,
    /// Load on the first job and cache for the process lifetime
    Lazy,
}

impl std::str::FromStr for InitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eager" => Ok(Self::Eager),
            "lazy" => Ok(Self::Lazy),
            other => Err(format!("unknown init policy '{other}', expected 'eager' or 'lazy'")),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:8001").expect("must be valid URL")
}

fn default_device() -> String {
    "cuda".to_string()
}

fn default_timeout() -> String {
    "300s".to_string()
}
