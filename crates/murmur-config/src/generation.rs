use serde::Deserialize;

/// Values used for optional generation parameters a job leaves out
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationDefaults {
    /// Emotion exaggeration
    #[serde(default = "default_exaggeration")]
    pub exaggeration: f32,
    /// Classifier-free guidance weight
    #[serde(default = "default_cfg_weight")]
    pub cfg_weight: f32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            exaggeration: default_exaggeration(),
            cfg_weight: default_cfg_weight(),
            temperature: default_temperature(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_exaggeration() -> f32 {
    0.5
}

#[allow(clippy::missing_const_for_fn)]
fn default_cfg_weight() -> f32 {
    0.5
}

#[allow(clippy::missing_const_for_fn)]
fn default_temperature() -> f32 {
    0.8
}
