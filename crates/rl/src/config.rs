use crate::error::{Result, RlError};
use serde::{Deserialize, Serialize};

/// How the next episode window is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeSample {
    /// Always the most recent `episode_length` rows.
    #[default]
    Fixed,
    /// A uniformly drawn window.
    Random,
}

/// Where the observation standardizer gets its statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationScaling {
    #[default]
    Bounds,
    Running,
}

/// Where the returns normalizer gets its scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnScaling {
    #[default]
    Batch,
    Running,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub episode_sample: EpisodeSample,
    /// Window length in steps. `0` uses the whole table.
    pub episode_length: usize,
    pub discount: f32,
    pub learning_rate: f32,
    pub seed: u64,
    /// Hidden layer widths of the Gaussian policy network.
    pub hidden: Vec<usize>,
    pub observation_scaling: ObservationScaling,
    pub return_scaling: ReturnScaling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            episode_sample: EpisodeSample::Fixed,
            episode_length: 2016,
            discount: 0.99,
            learning_rate: 0.001,
            seed: 0,
            hidden: vec![25, 25],
            observation_scaling: ObservationScaling::Bounds,
            return_scaling: ReturnScaling::Batch,
        }
    }
}

impl Config {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| RlError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.discount) {
            return Err(RlError::Configuration(format!(
                "discount must be within [0, 1], got {}",
                self.discount
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(RlError::Configuration(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.hidden.iter().any(|&w| w == 0) {
            return Err(RlError::Configuration("hidden layer widths must be non-zero".into()));
        }
        Ok(())
    }
}
