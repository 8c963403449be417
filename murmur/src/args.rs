use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use murmur_config::{Config, InitPolicy};

/// Murmur speech synthesis worker
#[derive(Debug, Parser)]
#[command(name = "murmur", about = "Serverless text-to-speech job worker")]
pub struct Args {
    /// Path to configuration file; built-in defaults are used when omitted
    #[arg(short, long, env = "MURMUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "MURMUR_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Override the model init policy (eager or lazy)
    #[arg(long, env = "MURMUR_INIT")]
    pub init: Option<InitPolicy>,

    /// Override the voice reference sample path
    #[arg(long, env = "VOICE_REF_PATH")]
    pub voice_ref_path: Option<PathBuf>,

    /// Log filter directive
    #[arg(long, default_value = "info", env = "MURMUR_LOG")]
    pub log_filter: String,

    /// Run a single job from this JSON and exit instead of serving
    #[arg(long, alias = "test_input", value_name = "JSON")]
    pub test_input: Option<String>,
}

impl Args {
    /// Load the configuration file (or defaults) and apply overrides
    pub fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(listen) = self.listen {
            config.server.listen_address = Some(listen);
        }
        if let Some(init) = self.init {
            config.model.init = init;
        }
        if let Some(path) = &self.voice_ref_path {
            config.voice.reference_path.clone_from(path);
        }
    }
}
